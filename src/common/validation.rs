// src/common/validation.rs

use validator::ValidationError;

/// Valida um CPF pelo algoritmo oficial dos dois dígitos verificadores
/// (soma ponderada módulo 11, duas passadas).
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    // Sequências repetidas (111.111.111-11 etc) passam no checksum, mas são inválidas.
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let check_digit = |len: u32| -> u32 {
        let sum: u32 = digits
            .iter()
            .take(len as usize)
            .enumerate()
            .map(|(i, &d)| d * (len + 1 - i as u32))
            .sum();
        let remainder = (sum * 10) % 11;
        if remainder >= 10 { 0 } else { remainder }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if is_valid_cpf(cpf) {
        Ok(())
    } else {
        Err(ValidationError::new("cpf").with_message("CPF inválido".into()))
    }
}

/// Telefone brasileiro no formato (11) 99999-9999 (hífen e espaço opcionais).
pub fn validate_telefone(telefone: &str) -> Result<(), ValidationError> {
    let err = || {
        ValidationError::new("telefone")
            .with_message("Telefone inválido. Ex: (11) 99999-9999".into())
    };

    let trimmed = telefone.trim();
    let rest = trimmed.strip_prefix('(').ok_or_else(err)?;
    let (ddd, rest) = rest.split_once(')').ok_or_else(err)?;
    if ddd.len() != 2 || !ddd.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    let number: String = rest
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !(8..=9).contains(&number.len()) || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    Ok(())
}

/// CEP no formato 00000-000 (hífen opcional).
pub fn validate_cep(cep: &str) -> Result<(), ValidationError> {
    let digits: String = cep.chars().filter(|c| *c != '-').collect();
    if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("cep").with_message("CEP inválido".into()))
    }
}

/// Senha forte: pelo menos uma maiúscula e um número (o mínimo de 6
/// caracteres fica na anotação `length` do payload).
pub fn validate_senha(senha: &str) -> Result<(), ValidationError> {
    if !senha.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new("senha")
            .with_message("Senha deve conter pelo menos uma letra maiúscula".into()));
    }
    if !senha.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("senha")
            .with_message("Senha deve conter pelo menos um número".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_cpfs_validos() {
        assert!(is_valid_cpf("529.982.247-25"));
        assert!(is_valid_cpf("111.444.777-35"));
        assert!(is_valid_cpf("52998224725"));
    }

    #[test]
    fn rejeita_cpfs_invalidos() {
        // dígito verificador errado
        assert!(!is_valid_cpf("529.982.247-26"));
        assert!(!is_valid_cpf("123.456.789-00"));
        // sequência repetida
        assert!(!is_valid_cpf("111.111.111-11"));
        // tamanho errado
        assert!(!is_valid_cpf("5299822472"));
        assert!(!is_valid_cpf(""));
    }

    #[test]
    fn valida_telefone() {
        assert!(validate_telefone("(11) 99999-9999").is_ok());
        assert!(validate_telefone("(11)33334444").is_ok());
        assert!(validate_telefone("11999999999").is_err());
        assert!(validate_telefone("(1) 99999-9999").is_err());
    }

    #[test]
    fn valida_cep() {
        assert!(validate_cep("01310-100").is_ok());
        assert!(validate_cep("01310100").is_ok());
        assert!(validate_cep("1310-100").is_err());
        assert!(validate_cep("abcde-fgh").is_err());
    }

    #[test]
    fn valida_senha() {
        assert!(validate_senha("Segura1").is_ok());
        assert!(validate_senha("semmaiuscula1").is_err());
        assert!(validate_senha("SemNumero").is_err());
    }
}
