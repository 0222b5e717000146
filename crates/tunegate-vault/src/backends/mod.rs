pub mod hashicorp_vault;
pub mod memory;
