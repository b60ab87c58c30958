//! number.rs — Affichage des flottants neon
//!
//! Format unique, reproduit par le prélude C (`print_float`) :
//! - chiffres significatifs : la plus courte écriture qui relit la même valeur ;
//! - notation fixe si l'exposant décimal est dans `-5..17`, scientifique sinon
//!   (`1e+20`, `2.5e-07`, exposant sur au moins deux chiffres) ;
//! - `nan`, `inf`, `-inf`, `-0`.

/// Bornes (exposant décimal) de la notation fixe.
const FIXED_MIN_EXP: i32 = -5;
const FIXED_MAX_EXP: i32 = 17;

pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf".into() } else { "inf".into() };
    }
    let sign = if x.is_sign_negative() { "-" } else { "" };
    if x == 0.0 {
        return format!("{sign}0");
    }

    // `{:e}` donne déjà les chiffres les plus courts : "3.0000000000000004e-1".
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let body = if (FIXED_MIN_EXP..FIXED_MAX_EXP).contains(&exp) {
        fixed(&digits, exp)
    } else {
        let (head, tail) = digits.split_at(1);
        let dot = if tail.is_empty() { "" } else { "." };
        let esign = if exp < 0 { '-' } else { '+' };
        format!("{head}{dot}{tail}e{esign}{:02}", exp.abs())
    };
    format!("{sign}{body}")
}

fn fixed(digits: &str, exp: i32) -> String {
    let n = digits.len();
    if exp < 0 {
        let zeros = "0".repeat(exp.unsigned_abs() as usize - 1);
        return format!("0.{zeros}{digits}");
    }
    let int_len = exp as usize + 1;
    if int_len >= n {
        format!("{digits}{}", "0".repeat(int_len - n))
    } else {
        format!("{}.{}", &digits[..int_len], &digits[int_len..])
    }
}

/* --------------------------------- Tests --------------------------------- */
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_notation() {
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(3.0), "3");
        assert_eq!(format_float(100.0), "100");
        assert_eq!(format_float(-12.75), "-12.75");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "0.00001");
        assert_eq!(format_float(1e16), "10000000000000000");
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(format_float(1e17), "1e+17");
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(1.5e300), "1.5e+300");
        assert_eq!(format_float(2.5e-7), "2.5e-07");
        assert_eq!(format_float(-1e-6), "-1e-06");
    }

    #[test]
    fn special_values() {
        assert_eq!(format_float(f64::NAN), "nan");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(-0.0), "-0");
    }
}
