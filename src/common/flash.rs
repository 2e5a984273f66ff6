// src/common/flash.rs

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

// Cookie que carrega a mensagem até a próxima página
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Nivel {
    Success,
    Info,
    Warning,
    Error,
}

impl Nivel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nivel::Success => "success",
            Nivel::Info => "info",
            Nivel::Warning => "warning",
            Nivel::Error => "error",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(Nivel::Success),
            "info" => Some(Nivel::Info),
            "warning" => Some(Nivel::Warning),
            "error" => Some(Nivel::Error),
            _ => None,
        }
    }
}

/// Mensagem de uma única leitura, entregue junto com um redirecionamento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub nivel: Nivel,
    pub mensagem: String,
}

impl Flash {
    pub fn new(nivel: Nivel, mensagem: impl Into<String>) -> Self {
        Self { nivel, mensagem: mensagem.into() }
    }

    pub fn success(mensagem: impl Into<String>) -> Self {
        Self::new(Nivel::Success, mensagem)
    }

    pub fn info(mensagem: impl Into<String>) -> Self {
        Self::new(Nivel::Info, mensagem)
    }

    pub fn warning(mensagem: impl Into<String>) -> Self {
        Self::new(Nivel::Warning, mensagem)
    }

    pub fn error(mensagem: impl Into<String>) -> Self {
        Self::new(Nivel::Error, mensagem)
    }

    /// "nivel:mensagem" em percent-encoding (cookies não aceitam espaço nem acento).
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.nivel.as_str(), self.mensagem);
        url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
    }

    pub fn decode(value: &str) -> Option<Self> {
        // Sem '=' nem '&' no valor codificado, o parser devolve tudo como a chave.
        let (decoded, _) = url::form_urlencoded::parse(value.as_bytes()).next()?;
        let (nivel, mensagem) = decoded.split_once(':')?;
        Some(Self::new(Nivel::parse(nivel)?, mensagem))
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        Cookie::build((FLASH_COOKIE, self.encode()))
            .path("/")
            .http_only(true)
            .build()
    }

    /// Lê e consome a mensagem pendente.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::decode(c.value()));
        if flash.is_none() {
            return (jar, None);
        }
        let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        (jar, flash)
    }
}

/// `302 Found`. O `Redirect::to` do axum responde 303.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn redirect_with(location: &str, flash: Flash) -> Response {
    let jar = CookieJar::new().add(flash.into_cookie());
    (jar, found(location)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_decode_keep_accents_and_spaces() {
        let flash = Flash::error("Você não tem acesso a esta empresa.");
        let encoded = flash.encode();

        assert!(!encoded.contains(' '));
        assert_eq!(Flash::decode(&encoded), Some(flash));
    }

    #[test]
    fn decode_rejects_unknown_level() {
        let encoded: String = url::form_urlencoded::byte_serialize(b"panic:boom").collect();
        assert_eq!(Flash::decode(&encoded), None);
        assert_eq!(Flash::decode("sem-separador"), None);
    }

    #[test]
    fn redirect_is_302_with_cookie() {
        let response = redirect_with("/acme/", Flash::error("Código NFC não encontrado."));

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/acme/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("flash="));
    }

    #[test]
    fn take_clears_pending_message() {
        let jar = CookieJar::new().add(Flash::info("Olá").into_cookie());
        let (jar, flash) = Flash::take(jar);

        assert_eq!(flash, Some(Flash::info("Olá")));
        assert!(jar.get(FLASH_COOKIE).is_none());
    }
}
