pub mod index;
pub mod init;
pub mod rag;
pub mod rebuild;
pub mod search;
pub mod stats;
