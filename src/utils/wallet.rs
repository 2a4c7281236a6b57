use std::str::FromStr;

use tiny_keccak::{Hasher, Keccak};
use web3::types::H160;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(data);
    keccak.finalize(&mut output);
    output
}

/// EIP-55 mixed-case rendering of an address.
pub fn to_checksum_address(address: &H160) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());

    let checksummed: String = lower
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect();

    format!("0x{}", checksummed)
}

/// Parses a `0x`-prefixed wallet address. All-lowercase and all-uppercase
/// input is accepted as is; mixed case must carry a valid EIP-55 checksum.
pub fn parse_wallet_address(raw: &str) -> Result<H160, String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| "Address must start with 0x".to_string())?;

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Address must be 40 hexadecimal characters".to_string());
    }

    let address = H160::from_str(digits).map_err(|e| format!("Invalid address: {}", e))?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum_address(&address)[2..] != *digits {
        return Err("Address checksum mismatch".to_string());
    }

    Ok(address)
}

/// Lower-cased `0x` form used as the storage key for wallets.
pub fn normalize_wallet_address(raw: &str) -> Result<String, String> {
    let address = parse_wallet_address(raw)?;
    Ok(format!("0x{}", hex::encode(address.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksum_round_trip() {
        for address in CHECKSUMMED {
            let parsed = parse_wallet_address(address).unwrap();
            assert_eq!(to_checksum_address(&parsed), address);
        }
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let tampered = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(
            parse_wallet_address(tampered),
            Err("Address checksum mismatch".to_string())
        );
    }

    #[test]
    fn test_single_case_accepted() {
        let lower = CHECKSUMMED[0].to_lowercase();
        assert!(parse_wallet_address(&lower).is_ok());
        let upper = format!("0x{}", CHECKSUMMED[0][2..].to_uppercase());
        assert!(parse_wallet_address(&upper).is_ok());
    }

    #[test]
    fn test_malformed_addresses() {
        assert!(parse_wallet_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
        assert!(parse_wallet_address("0x1234").is_err());
        assert!(parse_wallet_address("0xzzzzb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(
            normalize_wallet_address(CHECKSUMMED[1]).unwrap(),
            "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359"
        );
    }
}
