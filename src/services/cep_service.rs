// src/services/cep_service.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Consulta de CEP no ViaCEP. Falha de rede ou CEP desconhecido nunca
// interrompe o fluxo de cadastro: o resultado simplesmente vem vazio.
#[derive(Clone)]
pub struct CepService {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CepAddress {
    #[schema(example = "Avenida Paulista")]
    pub street: String,
    #[schema(example = "Bela Vista")]
    pub neighborhood: String,
    #[schema(example = "São Paulo")]
    pub city: String,
    #[schema(example = "SP")]
    pub state: String,
}

// Forma do JSON do ViaCEP. `erro` vem como `true` quando o CEP não existe.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
    #[serde(default)]
    erro: bool,
}

impl CepService {
    pub fn new() -> Self {
        Self::with_base_url("https://viacep.com.br/ws")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Só os oito dígitos, ou nada.
    fn normalize(cep: &str) -> Option<String> {
        let digits: String = cep.chars().filter(|c| c.is_ascii_digit()).collect();
        (digits.len() == 8).then_some(digits)
    }

    pub async fn lookup(&self, cep: &str) -> Option<CepAddress> {
        let digits = Self::normalize(cep)?;
        let url = format!("{}/{}/json/", self.base_url, digits);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Consulta de CEP indisponível: {}", e);
                return None;
            }
        };

        let body: ViaCepResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Resposta inesperada do ViaCEP: {}", e);
                return None;
            }
        };

        if body.erro {
            return None;
        }
        Some(CepAddress {
            street: body.logradouro,
            neighborhood: body.bairro,
            city: body.localidade,
            state: body.uf,
        })
    }
}

impl Default for CepService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizacao_aceita_so_oito_digitos() {
        assert_eq!(CepService::normalize("01310-100"), Some("01310100".to_string()));
        assert_eq!(CepService::normalize("01310100"), Some("01310100".to_string()));
        assert_eq!(CepService::normalize("1310-100"), None);
        assert_eq!(CepService::normalize("abcdefgh"), None);
    }

    #[tokio::test]
    async fn cep_malformado_nem_chega_na_rede() {
        let service = CepService::with_base_url("http://127.0.0.1:0");
        assert!(service.lookup("123").await.is_none());
    }
}
