//! Static symbol dictionaries for well-known domain constants.
//!
//! Two independent tables map frequently used constants to single-byte
//! codes: currency tickers and token contract addresses. Codes start at 1;
//! 0 is reserved as "no match" and never appears in a table. The tables are
//! process-wide singletons, initialized once and never mutated, so
//! unsynchronized concurrent reads are safe. They must never be
//! cross-applied: a ticker code means nothing to the address table and
//! vice versa.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::Address;

/// Canonical currency tickers, in code order (code = index + 1).
const TICKERS: &[&str] = &[
    "ETH", "WETH", "USDC", "USDT", "DAI", "WBTC", "MATIC", "POL", "BNB", "AVAX", "OP", "ARB",
    "GNO", "CELO", "FTM",
];

/// Well-known token contracts, in code order (code = index + 1).
/// Mainnet stablecoins and wrapped assets first, then their major L2 twins.
const TOKENS: &[&str] = &[
    "a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // USDC (mainnet)
    "dac17f958d2ee523a2206206994597c13d831ec7", // USDT (mainnet)
    "6b175474e89094c44da98b954eedeac495271d0f", // DAI (mainnet)
    "c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2", // WETH (mainnet)
    "2260fac5e5542a773aa44fbcfedf7c193bc2c599", // WBTC (mainnet)
    "2791bca1f2de4661ed88a30c99a7a9449aa84174", // USDC.e (Polygon)
    "af88d065e77c8cc2239327c5edb3a432268e5831", // USDC (Arbitrum)
    "0b2c639c533813f4aa9d7837caf62653d097ff85", // USDC (Optimism)
    "833589fcd6edb6e08f4c7c32d4f71b54bda02913", // USDC (Base)
    "fd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9", // USDT (Arbitrum)
];

lazy_static! {
    static ref TICKER_CODES: FxHashMap<String, u8> = TICKERS
        .iter()
        .enumerate()
        .map(|(i, ticker)| (ticker.to_ascii_uppercase(), (i + 1) as u8))
        .collect();
    static ref TOKEN_ADDRESSES: Vec<Address> = TOKENS
        .iter()
        .map(|hex| hex.parse().expect("token table entries are valid 40-char hex"))
        .collect();
    static ref TOKEN_CODES: FxHashMap<Address, u8> = TOKEN_ADDRESSES
        .iter()
        .enumerate()
        .map(|(i, addr)| (*addr, (i + 1) as u8))
        .collect();
}

/// Looks up the dictionary code for a currency ticker, case-insensitively.
/// Returns `None` ("no match") for tickers absent from the table.
pub fn currency_code(ticker: &str) -> Option<u8> {
    TICKER_CODES.get(&ticker.to_ascii_uppercase()).copied()
}

/// Returns the canonical-case ticker for a currency code.
pub fn currency_for_code(code: u8) -> Option<&'static str> {
    if code == 0 {
        return None;
    }
    TICKERS.get(code as usize - 1).copied()
}

/// Looks up the dictionary code for a token contract address.
/// Returns `None` ("no match") for addresses absent from the table.
pub fn token_code(address: &Address) -> Option<u8> {
    TOKEN_CODES.get(address).copied()
}

/// Returns the address for a token code.
pub fn token_for_code(code: u8) -> Option<Address> {
    if code == 0 {
        return None;
    }
    TOKEN_ADDRESSES.get(code as usize - 1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_table_roundtrip() {
        for (i, ticker) in TICKERS.iter().enumerate() {
            let code = (i + 1) as u8;
            assert_eq!(currency_code(ticker), Some(code));
            assert_eq!(currency_for_code(code), Some(*ticker));
        }
    }

    #[test]
    fn test_ticker_lookup_case_insensitive() {
        assert_eq!(currency_code("usdc"), currency_code("USDC"));
        assert_eq!(currency_code("UsDc"), currency_code("USDC"));
        // Decode side always returns canonical case
        let code = currency_code("usdc").unwrap();
        assert_eq!(currency_for_code(code), Some("USDC"));
    }

    #[test]
    fn test_unknown_ticker_no_match() {
        assert_eq!(currency_code("DOGE"), None);
        assert_eq!(currency_code(""), None);
    }

    #[test]
    fn test_token_table_roundtrip() {
        for (i, hex) in TOKENS.iter().enumerate() {
            let code = (i + 1) as u8;
            let addr: Address = hex.parse().unwrap();
            assert_eq!(token_code(&addr), Some(code));
            assert_eq!(token_for_code(code), Some(addr));
        }
    }

    #[test]
    fn test_unknown_token_no_match() {
        let addr = Address::from_bytes([0x42; 20]);
        assert_eq!(token_code(&addr), None);
    }

    #[test]
    fn test_code_zero_reserved() {
        assert_eq!(currency_for_code(0), None);
        assert_eq!(token_for_code(0), None);
    }

    #[test]
    fn test_out_of_range_codes() {
        assert_eq!(currency_for_code(200), None);
        assert_eq!(token_for_code(200), None);
    }
}
