//! Locale-specific vocabularies used by the generators.

use crate::generator::GeneratorError;
use serde::{Deserialize, Serialize};

/// Language/region the fake data is shaped after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Brazilian Portuguese
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    /// American English
    #[serde(rename = "en-US")]
    EnUs,
}

/// Word pools for one locale.
pub struct Vocabulary {
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub street_prefixes: &'static [&'static str],
    pub street_suffixes: &'static [&'static str],
    pub neighbourhoods: &'static [&'static str],
    pub cities: &'static [&'static str],
    pub states: &'static [&'static str],
    pub company_connectors: &'static [&'static str],
    pub company_suffixes: &'static [&'static str],
    pub email_domains: &'static [&'static str],
}

const PT_BR: Vocabulary = Vocabulary {
    first_names: &[
        "Ana", "João", "Maria", "José", "Francisco", "Antônio", "Luíza", "Carlos", "Paulo",
        "Fernanda", "Lucas", "Beatriz", "Gabriel", "Júlia", "Rafael", "Larissa", "Mateus",
        "Camila", "Thiago", "Letícia",
    ],
    last_names: &[
        "Silva", "Santos", "Oliveira", "Souza", "Rodrigues", "Ferreira", "Alves", "Pereira",
        "Lima", "Gomes", "Costa", "Ribeiro", "Martins", "Carvalho", "Araújo", "Melo", "Barbosa",
        "Rocha", "Dias", "Nascimento",
    ],
    street_prefixes: &["Rua", "Avenida", "Travessa", "Alameda", "Rodovia", "Praça"],
    street_suffixes: &["", "", "", "Norte", "Sul"],
    neighbourhoods: &[
        "Centro", "Jardim América", "Vila Nova", "Boa Vista", "Santa Cruz", "São José",
        "Cidade Nova", "Bela Vista",
    ],
    cities: &[
        "São Paulo", "Campinas", "Belo Horizonte", "Curitiba", "Recife", "Salvador",
        "Porto Alegre", "Goiânia",
    ],
    states: &["SP", "RJ", "MG", "PR", "PE", "BA", "RS", "GO", "SC", "CE"],
    company_connectors: &["e", "&", "-"],
    company_suffixes: &["Ltda.", "S.A.", "EPP", "ME", "S/A"],
    email_domains: &["gmail.com", "hotmail.com", "yahoo.com.br", "bol.com.br", "uol.com.br"],
};

const EN_US: Vocabulary = Vocabulary {
    first_names: &[
        "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
        "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica",
    ],
    last_names: &[
        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
        "Rodriguez", "Martinez", "Wilson", "Anderson", "Taylor", "Thomas", "Moore", "Jackson",
    ],
    street_prefixes: &["Main", "Oak", "Pine", "Maple", "Cedar", "Elm", "Washington", "Lake"],
    street_suffixes: &["Street", "Avenue", "Road", "Lane", "Boulevard", "Drive"],
    neighbourhoods: &["Downtown", "Midtown", "Westside", "Eastside", "Old Town", "Riverside"],
    cities: &[
        "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview",
        "Salem",
    ],
    states: &["CA", "TX", "NY", "FL", "IL", "PA", "OH", "GA", "NC", "MI"],
    company_connectors: &["and", "&", "-"],
    company_suffixes: &["Inc", "LLC", "Group", "PLC", "Ltd"],
    email_domains: &["gmail.com", "yahoo.com", "hotmail.com"],
};

impl Locale {
    pub fn vocabulary(&self) -> &'static Vocabulary {
        match self {
            Locale::PtBr => &PT_BR,
            Locale::EnUs => &EN_US,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::PtBr => write!(f, "pt-BR"),
            Locale::EnUs => write!(f, "en-US"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = GeneratorError;

    /// Accepts both `pt-BR` and the `pt_BR` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").to_lowercase().as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            _ => Err(GeneratorError::UnknownLocale(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale() {
        assert_eq!("pt_BR".parse::<Locale>().unwrap(), Locale::PtBr);
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert!("fr_FR".parse::<Locale>().is_err());
    }

    #[test]
    fn test_vocabularies_are_populated() {
        for locale in [Locale::PtBr, Locale::EnUs] {
            let vocab = locale.vocabulary();
            assert!(!vocab.first_names.is_empty());
            assert!(!vocab.last_names.is_empty());
            assert!(!vocab.email_domains.is_empty());
        }
    }
}
