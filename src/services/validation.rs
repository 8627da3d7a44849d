// src/services/validation.rs

// Regras de formato compartilhadas pela hierarquia de armazenamento.
// Validação acontece o mais perto possível da entrada, sempre antes de
// qualquer escrita.

use crate::common::error::AppError;

const MAX_NAME_LEN: usize = 100;
const MAX_ALIAS_LEN: usize = 100;
const MAX_SUBDOMAIN_LEN: usize = 63;

/// Nome de entidade: não vazio (ignorando espaços) e até 100 caracteres.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation(
            "name",
            "name_empty",
            "O nome não pode ser vazio.",
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(
            "name",
            "name_too_long",
            "O nome é muito longo (máximo de 100 caracteres).",
        ));
    }
    Ok(())
}

/// Alias: não vazio, até 100 caracteres, apenas `[A-Za-z0-9_-]`
/// (sem espaços).
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.trim().is_empty() {
        return Err(AppError::validation(
            "alias",
            "alias_empty",
            "O alias não pode ser vazio.",
        ));
    }
    if alias.chars().count() > MAX_ALIAS_LEN {
        return Err(AppError::validation(
            "alias",
            "alias_too_long",
            "O alias é muito longo (máximo de 100 caracteres).",
        ));
    }
    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::validation(
            "alias",
            "alias_format",
            "O alias só pode conter letras, números, '_' e '-' (sem espaços).",
        ));
    }
    Ok(())
}

/// Subdomínio de organização: não vazio, até 63 caracteres,
/// apenas `[a-z0-9-]`.
pub fn validate_subdomain(subdomain: &str) -> Result<(), AppError> {
    if subdomain.trim().is_empty() {
        return Err(AppError::validation(
            "subdomain",
            "subdomain_empty",
            "O subdomínio não pode ser vazio.",
        ));
    }
    if subdomain.chars().count() > MAX_SUBDOMAIN_LEN {
        return Err(AppError::validation(
            "subdomain",
            "subdomain_too_long",
            "O subdomínio é muito longo (máximo de 63 caracteres).",
        ));
    }
    if !subdomain
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::validation(
            "subdomain",
            "subdomain_format",
            "O subdomínio só pode conter letras minúsculas, números e '-'.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_name_and_alias() {
        assert!(validate_name("Corredor A").is_ok());
        assert!(validate_alias("corredor-a_1").is_ok());
        assert!(validate_alias(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace_name() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn rejects_name_over_100_chars() {
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn rejects_alias_with_space() {
        assert!(validate_alias("corredor a").is_err());
    }

    #[test]
    fn rejects_alias_with_symbols() {
        assert!(validate_alias("corredor/a").is_err());
        assert!(validate_alias("célula").is_err());
    }

    #[test]
    fn rejects_alias_over_100_chars() {
        assert!(validate_alias(&"x".repeat(101)).is_err());
    }

    #[test]
    fn subdomain_rules() {
        assert!(validate_subdomain("acme-01").is_ok());
        assert!(validate_subdomain("Acme").is_err());
        assert!(validate_subdomain("").is_err());
        assert!(validate_subdomain(&"a".repeat(64)).is_err());
    }
}
