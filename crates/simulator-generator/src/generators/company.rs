//! Client (company) records.

use super::{address, ascii_free_email, digits, digits_to_string, mod11_check_digit, phone_number, pick};
use crate::generator::Record;
use crate::locale::Locale;
use rand::Rng;
use serde_json::Value;

/// Generate one client.
pub fn client<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> Record {
    let vocab = locale.vocabulary();
    let mut record = Record::new();
    record.insert("name".into(), Value::String(company_name(rng, locale)));
    record.insert("cnpj".into(), Value::String(company_id(rng, locale)));
    record.insert("address".into(), Value::String(address(rng, locale)));
    record.insert("phone_number".into(), Value::String(phone_number(rng, locale)));
    record.insert("e-mail".into(), Value::String(ascii_free_email(rng, vocab)));
    record
}

/// Company name followed by a legal suffix, e.g. `Silva e Costa Ltda.`.
pub fn company_name<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    let vocab = locale.vocabulary();
    format!(
        "{} {} {} {}",
        pick(rng, vocab.last_names),
        pick(rng, vocab.company_connectors),
        pick(rng, vocab.last_names),
        pick(rng, vocab.company_suffixes)
    )
}

/// CNPJ (`00.000.000/0001-00`, valid check digits) or EIN (`00-0000000`).
pub fn company_id<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    match locale {
        Locale::PtBr => {
            let mut cnpj = digits(rng, 8);
            cnpj.extend([0, 0, 0, 1]);
            let first = mod11_check_digit(&cnpj, &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
            cnpj.push(first);
            let second = mod11_check_digit(&cnpj, &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
            cnpj.push(second);
            let s = digits_to_string(&cnpj);
            format!(
                "{}.{}.{}/{}-{}",
                &s[..2],
                &s[2..5],
                &s[5..8],
                &s[8..12],
                &s[12..]
            )
        }
        Locale::EnUs => {
            let s = digits_to_string(&digits(rng, 9));
            format!("{}-{}", &s[..2], &s[2..])
        }
    }
}
