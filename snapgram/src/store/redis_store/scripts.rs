use redis::Script;
use std::sync::LazyLock;

pub const DOCUMENT_PATCH_SCRIPT_BODY: &str = include_str!("../../../lua/document_patch.lua");

pub static DOCUMENT_PATCH_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DOCUMENT_PATCH_SCRIPT_BODY));
