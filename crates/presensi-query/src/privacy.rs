//! Masking of personal data before display.

/// Mask the local part of an email address.
///
/// `john.doe@gmail.com` becomes `jo****oe@gmail.com`. Short local parts keep
/// only their first (and, up to four characters, last) character. Values
/// without `@` are returned unchanged.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let chars: Vec<char> = local.chars().collect();
    let first: String = chars.iter().take(1).collect();

    if chars.len() <= 2 {
        return format!("{first}****@{domain}");
    }

    if chars.len() <= 4 {
        let last = chars[chars.len() - 1];
        return format!("{first}****{last}@{domain}");
    }

    let front: String = chars[..2].iter().collect();
    let back: String = chars[chars.len() - 2..].iter().collect();
    format!("{front}****{back}@{domain}")
}
