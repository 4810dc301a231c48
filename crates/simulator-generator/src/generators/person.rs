//! Driver records.

use super::{address, ascii_free_email, digits, digits_to_string, full_name, mod11_check_digit, phone_number};
use crate::generator::Record;
use crate::locale::Locale;
use rand::Rng;
use serde_json::Value;

/// Generate one driver.
pub fn driver<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> Record {
    let vocab = locale.vocabulary();
    let mut record = Record::new();
    record.insert("name".into(), Value::String(full_name(rng, vocab)));
    record.insert("cnh_number".into(), Value::String(national_id(rng, locale)));
    record.insert("address".into(), Value::String(address(rng, locale)));
    record.insert("phone_number".into(), Value::String(phone_number(rng, locale)));
    record.insert("e-mail".into(), Value::String(ascii_free_email(rng, vocab)));
    record
}

/// CPF (`000.000.000-00`, valid check digits) or SSN (`000-00-0000`).
pub fn national_id<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    match locale {
        Locale::PtBr => {
            let mut cpf = digits(rng, 9);
            let first = mod11_check_digit(&cpf, &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
            cpf.push(first);
            let second = mod11_check_digit(&cpf, &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
            cpf.push(second);
            let s = digits_to_string(&cpf);
            format!("{}.{}.{}-{}", &s[..3], &s[3..6], &s[6..9], &s[9..])
        }
        Locale::EnUs => {
            let s = digits_to_string(&digits(rng, 9));
            format!("{}-{}-{}", &s[..3], &s[3..5], &s[5..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_driver_fields() {
        let mut rng = StdRng::seed_from_u64(42);
        let record = driver(&mut rng, Locale::PtBr);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        for expected in ["name", "cnh_number", "address", "phone_number", "e-mail"] {
            assert!(keys.contains(&expected), "missing {expected}");
        }
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn test_cpf_format() {
        let mut rng = StdRng::seed_from_u64(1);
        let cpf = national_id(&mut rng, Locale::PtBr);
        assert_eq!(cpf.len(), 14);
        assert_eq!(&cpf[3..4], ".");
        assert_eq!(&cpf[11..12], "-");
    }
}
