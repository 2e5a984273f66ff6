// src/common/slug.rs

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Tamanho máximo da coluna `slug`.
pub const SLUG_MAX_LEN: usize = 100;

/// Espaço guardado no slug base para o sufixo `-N`.
pub const SLUG_SUFFIX_ROOM: usize = 6;

/// Quantas vezes tentamos de novo quando o INSERT esbarra no UNIQUE do slug.
pub const SLUG_MAX_ATTEMPTS: usize = 5;

/// Primeiros segmentos de rota que uma empresa não pode usar como slug.
pub const RESERVED_EMPRESA_SLUGS: &[&str] = &[
    "api",
    "api-docs",
    "criar-empresa",
    "dashboard",
    "health",
    "login",
    "logout",
    "media",
    "minha-empresa",
    "nfc",
    "registrar",
    "swagger-ui",
];

/// Slugs de pessoa que colidem com `/{empresa}/pessoas/nova/`.
pub const RESERVED_PESSOA_SLUGS: &[&str] = &["nova"];

/// Slugs de pet que colidem com `/{empresa}/pets/novo/`.
pub const RESERVED_PET_SLUGS: &[&str] = &["novo"];

/// Normaliza um nome para uso em URL: "José Ávila" -> "jose-avila".
///
/// Remove acentos (NFKD + descarte do que não é ASCII), descarta pontuação,
/// e junta espaços, hífens e sublinhados em um único hífen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.nfkd().filter(char::is_ascii) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
        // Qualquer outro símbolo some sem virar separador: "D'Ávila" -> "davila"
    }

    truncate(&slug, SLUG_MAX_LEN)
}

// O slug é ASCII puro, então cortar por byte é seguro.
fn truncate(slug: &str, max_len: usize) -> String {
    let mut slug = slug.to_string();
    if slug.len() > max_len {
        slug.truncate(max_len);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Base do slug de uma entidade; nomes sem nenhum caractere aproveitável
/// caem para o prefixo do próprio id. Fica curta o bastante para `base-N`
/// ainda caber na coluna.
pub fn base_slug(nome: &str, id: Uuid) -> String {
    let base = truncate(&slugify(nome), SLUG_MAX_LEN - SLUG_SUFFIX_ROOM);
    if base.is_empty() {
        id.simple().to_string()[..8].to_string()
    } else {
        base
    }
}

/// Escolhe `base`, `base-1`, `base-2`, ... o primeiro que não estiver em `taken`.
pub fn allocate(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut counter = 1usize;
    loop {
        let suffix = format!("-{}", counter);
        let candidate = format!("{}{}", truncate(base, SLUG_MAX_LEN - suffix.len()), suffix);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Como `allocate`, tratando `reserved` como já usados.
pub fn allocate_avoiding(base: &str, taken: &HashSet<String>, reserved: &[&str]) -> String {
    let mut taken = taken.clone();
    taken.extend(reserved.iter().map(|s| s.to_string()));
    allocate(base, &taken)
}

/// Como `allocate`, mas no escopo global das empresas.
pub fn allocate_empresa(base: &str, taken: &HashSet<String>) -> String {
    allocate_avoiding(base, taken, RESERVED_EMPRESA_SLUGS)
}

/// Padrão `LIKE` que encontra os sufixos numéricos já usados para `base`.
/// O slug só contém [a-z0-9-], então nada precisa de escape.
pub fn suffix_pattern(base: &str) -> String {
    format!("{}-%", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Ana Silva"), "ana-silva");
        assert_eq!(slugify("  Acme   Ltda  "), "acme-ltda");
        assert_eq!(slugify("Pet_Shop--Central"), "pet-shop-central");
    }

    #[test]
    fn slugify_strips_diacritics_and_symbols() {
        assert_eq!(slugify("José Ávila"), "jose-avila");
        assert_eq!(slugify("Açaí & Cia."), "acai-cia");
        assert_eq!(slugify("D'Ávila"), "davila");
        assert_eq!(slugify("Ração São João"), "racao-sao-joao");
    }

    #[test]
    fn slugify_empty_inputs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("日本"), "");
    }

    #[test]
    fn slugify_respects_column_length() {
        let long = "a ".repeat(80);
        let slug = slugify(&long);
        assert!(slug.len() <= SLUG_MAX_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn base_slug_falls_back_to_id_prefix() {
        let id = Uuid::parse_str("5f0c8a3e-1b2c-4d5e-8f90-123456789abc").unwrap();
        assert_eq!(base_slug("   ", id), "5f0c8a3e");
        assert_eq!(base_slug("Rex", id), "rex");
    }

    #[test]
    fn allocate_uses_base_when_free() {
        assert_eq!(allocate("ana-silva", &set(&[])), "ana-silva");
        assert_eq!(allocate("ana-silva", &set(&["ana-silva-1"])), "ana-silva");
    }

    #[test]
    fn allocate_appends_counter() {
        assert_eq!(allocate("ana-silva", &set(&["ana-silva"])), "ana-silva-1");
        assert_eq!(
            allocate("ana-silva", &set(&["ana-silva", "ana-silva-1", "ana-silva-2"])),
            "ana-silva-3"
        );
    }

    #[test]
    fn allocate_fills_first_gap() {
        let taken = set(&["rex", "rex-1", "rex-3"]);
        assert_eq!(allocate("rex", &taken), "rex-2");
    }

    #[test]
    fn repeated_allocation_yields_distinct_sequence() {
        let mut taken = HashSet::new();
        let mut produced = Vec::new();
        for _ in 0..4 {
            let slug = allocate("ana-silva", &taken);
            taken.insert(slug.clone());
            produced.push(slug);
        }
        assert_eq!(produced, vec!["ana-silva", "ana-silva-1", "ana-silva-2", "ana-silva-3"]);
    }

    #[test]
    fn empresa_slugs_skip_reserved_routes() {
        assert_eq!(allocate_empresa("dashboard", &set(&[])), "dashboard-1");
        assert_eq!(allocate_empresa("api", &set(&["api-1"])), "api-2");
        assert_eq!(allocate_empresa("acme", &set(&[])), "acme");
    }

    #[test]
    fn long_names_leave_room_for_counter() {
        let id = Uuid::new_v4();
        let base = base_slug(&"a".repeat(120), id);
        assert_eq!(base.len(), SLUG_MAX_LEN - SLUG_SUFFIX_ROOM);

        let second = allocate(&base, &set(&[base.as_str()]));
        assert_eq!(second, format!("{}-1", base));
        assert!(second.len() <= SLUG_MAX_LEN);
    }

    #[test]
    fn allocate_trims_full_length_base() {
        let base = format!("{}-b", "a".repeat(SLUG_MAX_LEN - 2));
        let second = allocate(&base, &set(&[base.as_str()]));

        assert!(second.len() <= SLUG_MAX_LEN, "len {}", second.len());
        assert!(second.ends_with("-1"));
        assert!(!second.contains("--"));
    }

    #[test]
    fn person_and_pet_slugs_skip_creation_routes() {
        assert_eq!(allocate_avoiding("nova", &set(&[]), RESERVED_PESSOA_SLUGS), "nova-1");
        assert_eq!(allocate_avoiding("novo", &set(&[]), RESERVED_PET_SLUGS), "novo-1");
        assert_eq!(allocate_avoiding("nova", &set(&[]), RESERVED_PET_SLUGS), "nova");
    }

    #[test]
    fn suffix_pattern_for_like_query() {
        assert_eq!(suffix_pattern("ana-silva"), "ana-silva-%");
    }
}
