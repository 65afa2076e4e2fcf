mod account_manifest;

pub use account_manifest::*;
