use crate::error::{Error, Result};

pub const DEFAULT_KEEP: usize = 3;
pub const DEFAULT_MASK: &str = "*";

/// Mask a secret, leaving only its last `keep` characters visible.
///
/// Secrets no longer than `keep` are returned unchanged; a `keep` of zero
/// masks everything. The result always has as many characters as the input.
/// `mask` must be exactly one character.
///
/// ```
/// use prettiprint::mask_secret;
///
/// assert_eq!(mask_secret("$upaS3cr3t", 3, "*").unwrap(), "*******r3t");
/// ```
pub fn mask_secret(secret: &str, keep: usize, mask: &str) -> Result<String> {
    let mask = single_char(mask)?;
    let len = secret.chars().count();

    if len <= keep {
        return Ok(secret.to_string());
    }

    let hidden = len - keep;
    Ok(secret
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { mask } else { c })
        .collect())
}

/// Convert a signed keep count coming from user input.
pub fn keep_from_signed(keep: i64) -> Result<usize> {
    usize::try_from(keep)
        .map_err(|_| Error::InvalidArgument(format!("keep must be non-negative, got {keep}")))
}

fn single_char(mask: &str) -> Result<char> {
    let mut chars = mask.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidArgument(format!(
            "mask must be exactly one character, got {mask:?}"
        ))),
    }
}
