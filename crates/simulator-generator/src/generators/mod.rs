//! Per-model record generators and the helpers they share.
//!
//! Each submodule turns an RNG (plus a locale where relevant) into one
//! [`Record`](crate::Record). Field sets are fixed per model so that an update
//! can always find a same-named replacement value in a fresh record.

pub mod company;
pub mod delivery;
pub mod location;
pub mod person;
pub mod product;
pub mod vehicle;

use crate::locale::{Locale, Vocabulary};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Pick one entry of a static word pool.
pub(crate) fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Random decimal digits, leading zeros allowed.
pub(crate) fn digits<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u32> {
    (0..count).map(|_| rng.random_range(0..10)).collect()
}

pub(crate) fn digits_to_string(digits: &[u32]) -> String {
    digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect()
}

/// Random uppercase ASCII letters.
pub(crate) fn letters<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect()
}

/// Full personal name.
pub(crate) fn full_name<R: Rng + ?Sized>(rng: &mut R, vocab: &Vocabulary) -> String {
    format!(
        "{} {} {}",
        pick(rng, vocab.first_names),
        pick(rng, vocab.last_names),
        pick(rng, vocab.last_names)
    )
}

/// Multi-line postal address shaped after the locale.
pub(crate) fn address<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    let vocab = locale.vocabulary();
    let number = rng.random_range(1..2000);
    match locale {
        Locale::PtBr => {
            let suffix = pick(rng, vocab.street_suffixes);
            let street = format!(
                "{} {} {}",
                pick(rng, vocab.street_prefixes),
                pick(rng, vocab.last_names),
                suffix
            );
            let cep = digits_to_string(&digits(rng, 8));
            format!(
                "{}, {}\n{}\n{}-{} {} / {}",
                street.trim_end(),
                number,
                pick(rng, vocab.neighbourhoods),
                &cep[..5],
                &cep[5..],
                pick(rng, vocab.cities),
                pick(rng, vocab.states)
            )
        }
        Locale::EnUs => format!(
            "{} {} {}\n{}, {}, {} {}",
            number,
            pick(rng, vocab.street_prefixes),
            pick(rng, vocab.street_suffixes),
            pick(rng, vocab.neighbourhoods),
            pick(rng, vocab.cities),
            pick(rng, vocab.states),
            digits_to_string(&digits(rng, 5))
        ),
    }
}

pub(crate) fn phone_number<R: Rng + ?Sized>(rng: &mut R, locale: Locale) -> String {
    match locale {
        Locale::PtBr => {
            let area = rng.random_range(11..100);
            let line = digits_to_string(&digits(rng, 8));
            format!("+55 ({area}) 9{}-{}", &line[..4], &line[4..])
        }
        Locale::EnUs => {
            let area = rng.random_range(201..990);
            let line = digits_to_string(&digits(rng, 7));
            format!("({area}) {}-{}", &line[..3], &line[3..])
        }
    }
}

/// Free-mail address made of ASCII characters only.
pub(crate) fn ascii_free_email<R: Rng + ?Sized>(rng: &mut R, vocab: &Vocabulary) -> String {
    let local = format!(
        "{}.{}{}",
        ascii_fold(pick(rng, vocab.first_names)),
        ascii_fold(pick(rng, vocab.last_names)),
        rng.random_range(1..100)
    );
    format!("{}@{}", local.to_lowercase(), pick(rng, vocab.email_domains))
}

/// Strip the diacritics that appear in the bundled vocabularies.
pub(crate) fn ascii_fold(input: &str) -> String {
    input
        .chars()
        .filter_map(|c| {
            let folded = match c {
                'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
                'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
                'é' | 'ê' | 'è' => 'e',
                'É' | 'Ê' | 'È' => 'E',
                'í' | 'ì' => 'i',
                'Í' | 'Ì' => 'I',
                'ó' | 'ô' | 'õ' | 'ò' => 'o',
                'Ó' | 'Ô' | 'Õ' | 'Ò' => 'O',
                'ú' | 'ü' | 'ù' => 'u',
                'Ú' | 'Ü' | 'Ù' => 'U',
                'ç' => 'c',
                'Ç' => 'C',
                c if c.is_ascii_alphanumeric() => c,
                _ => return None,
            };
            Some(folded)
        })
        .collect()
}

/// Mod-11 check digit used by both CPF and CNPJ.
pub(crate) fn mod11_check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ascii_fold() {
        assert_eq!(ascii_fold("João"), "Joao");
        assert_eq!(ascii_fold("Araújo"), "Araujo");
        assert_eq!(ascii_fold("Antônio"), "Antonio");
    }

    #[test]
    fn test_email_is_ascii() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let email = ascii_free_email(&mut rng, Locale::PtBr.vocabulary());
            assert!(email.is_ascii(), "{email}");
            assert_eq!(email.matches('@').count(), 1);
        }
    }

    #[test]
    fn test_mod11_check_digit() {
        // CPF 529.982.247-25
        let base = [5, 2, 9, 9, 8, 2, 2, 4, 7];
        let first = mod11_check_digit(&base, &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
        assert_eq!(first, 2);
        let mut with_first = base.to_vec();
        with_first.push(first);
        let second = mod11_check_digit(&with_first, &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);
        assert_eq!(second, 5);
    }

    #[test]
    fn test_phone_number_shape() {
        let mut rng = StdRng::seed_from_u64(9);
        let phone = phone_number(&mut rng, Locale::PtBr);
        assert!(phone.starts_with("+55 ("));
        let phone = phone_number(&mut rng, Locale::EnUs);
        assert!(phone.starts_with('('));
    }
}
