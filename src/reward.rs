//! Score-threshold reward sink
//!
//! The game only knows the `RewardSink` seam. The bundled implementation is
//! a stub devnet wallet: it validates the address shape, fabricates
//! signature-shaped receipts, and credits a simulated balance. No network
//! and no cryptography; real chain integration stays outside the game.

use std::fmt;

use thiserror::Error;

use crate::consts::{LAMPORTS_PER_SOL, REWARD_LAMPORTS};

/// Base58 alphabet (no 0, O, I, or l), as Solana addresses use
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Fallback recipient when no wallet address is configured
const DEMO_ADDRESS: &str = "HenRward11111111111111111111111111111111111";

#[derive(Debug, Error)]
pub enum RewardError {
    #[error("invalid wallet address: {reason}")]
    InvalidAddress { reason: String },
    #[error("score {score} is below the reward minimum {minimum}")]
    ScoreTooLow { score: u32, minimum: u32 },
}

/// Proof of a settled reward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardReceipt {
    /// Fabricated transaction signature
    pub signature: String,
    pub lamports: u64,
}

impl fmt::Display for RewardReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} SOL (signature {})",
            lamports_to_sol(self.lamports),
            self.signature
        )
    }
}

/// Where armed score-threshold crossings go
///
/// Called at most once per arming; a success means the score was spent.
pub trait RewardSink {
    fn on_score_threshold(&mut self, score: u32) -> Result<RewardReceipt, RewardError>;
    /// Simulated balance for HUD and logs
    fn balance_lamports(&self) -> u64;
}

#[inline]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Stand-in devnet wallet
///
/// "Connecting" only checks that the address looks like a key; rewards are
/// self-credited, mirroring a devnet self-transfer.
pub struct StubWallet {
    address: String,
    minimum_score: u32,
    balance: u64,
    rewards_sent: u32,
}

impl StubWallet {
    pub const NETWORK: &'static str = "Solana Devnet (stub)";

    /// Validate the address shape and seed the simulated balance
    pub fn connect(address: Option<&str>, minimum_score: u32) -> Result<Self, RewardError> {
        let address = address.unwrap_or(DEMO_ADDRESS);
        validate_address(address)?;
        let wallet = Self {
            address: address.to_string(),
            minimum_score,
            balance: LAMPORTS_PER_SOL,
            rewards_sent: 0,
        };
        log::info!(
            "Connected to {} as {} ({:.3} SOL)",
            Self::NETWORK,
            wallet.address,
            lamports_to_sol(wallet.balance)
        );
        Ok(wallet)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Signature-shaped string, deterministic per (address, send count, score)
    fn fabricate_signature(&self, score: u32) -> String {
        let mut acc: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.address.bytes() {
            acc = (acc ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3);
        }
        acc = (acc ^ self.rewards_sent as u64).wrapping_mul(0x0000_0100_0000_01b3);
        acc = (acc ^ score as u64).wrapping_mul(0x0000_0100_0000_01b3);

        let alphabet = BASE58_ALPHABET.as_bytes();
        let mut out = String::with_capacity(64);
        let mut x = acc;
        for _ in 0..64 {
            x = x
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            out.push(alphabet[((x >> 33) % 58) as usize] as char);
        }
        out
    }
}

impl RewardSink for StubWallet {
    fn on_score_threshold(&mut self, score: u32) -> Result<RewardReceipt, RewardError> {
        if score < self.minimum_score {
            return Err(RewardError::ScoreTooLow {
                score,
                minimum: self.minimum_score,
            });
        }

        let signature = self.fabricate_signature(score);
        self.rewards_sent += 1;
        self.balance += REWARD_LAMPORTS;
        let receipt = RewardReceipt {
            signature,
            lamports: REWARD_LAMPORTS,
        };
        log::info!("Reward sent: {}", receipt);
        Ok(receipt)
    }

    fn balance_lamports(&self) -> u64 {
        self.balance
    }
}

fn validate_address(address: &str) -> Result<(), RewardError> {
    let len = address.len();
    if !(32..=44).contains(&len) {
        return Err(RewardError::InvalidAddress {
            reason: format!("expected 32-44 characters, got {}", len),
        });
    }
    if let Some(bad) = address.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(RewardError::InvalidAddress {
            reason: format!("'{}' is not a base58 character", bad),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_with_demo_address() {
        let wallet = StubWallet::connect(None, 100).unwrap();
        assert_eq!(wallet.address(), DEMO_ADDRESS);
        assert_eq!(wallet.balance_lamports(), LAMPORTS_PER_SOL);
    }

    #[test]
    fn test_connect_rejects_bad_shape() {
        assert!(matches!(
            StubWallet::connect(Some("too-short"), 100),
            Err(RewardError::InvalidAddress { .. })
        ));
        // 'O' is not in the base58 alphabet.
        assert!(matches!(
            StubWallet::connect(Some("O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0O0"), 100),
            Err(RewardError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_reward_credits_and_signs() {
        let mut wallet = StubWallet::connect(None, 100).unwrap();
        let receipt = wallet.on_score_threshold(120).unwrap();

        assert_eq!(receipt.lamports, REWARD_LAMPORTS);
        assert_eq!(receipt.signature.len(), 64);
        assert!(
            receipt
                .signature
                .chars()
                .all(|c| BASE58_ALPHABET.contains(c))
        );
        assert_eq!(wallet.balance_lamports(), LAMPORTS_PER_SOL + REWARD_LAMPORTS);
    }

    #[test]
    fn test_reward_rejects_low_score() {
        let mut wallet = StubWallet::connect(None, 100).unwrap();
        assert!(matches!(
            wallet.on_score_threshold(50),
            Err(RewardError::ScoreTooLow { score: 50, minimum: 100 })
        ));
        assert_eq!(wallet.balance_lamports(), LAMPORTS_PER_SOL);
    }

    #[test]
    fn test_signatures_differ_between_sends() {
        let mut wallet = StubWallet::connect(None, 100).unwrap();
        let first = wallet.on_score_threshold(100).unwrap();
        let second = wallet.on_score_threshold(100).unwrap();
        assert_ne!(first.signature, second.signature);
    }
}
