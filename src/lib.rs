//! Workspace root crate; all functionality lives in the member crates under `crates/`.
