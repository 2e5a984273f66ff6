pub mod error;
pub mod flash;
pub mod pagination;
pub mod slug;
pub mod storage;
pub mod validation;
