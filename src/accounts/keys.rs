//! Key material boundary.
//!
//! # Security
//! - Key material never leaves the provider; callers hold opaque handles
//! - Seeds are never logged, serialized, or exposed through accessors
//!
//! Key generation and signature primitives are external collaborators;
//! this module defines the seam (`KeyProvider`) and ships an in-memory
//! development provider. A production deployment supplies an
//! ed25519/HSM-backed implementation of the same trait.

use async_trait::async_trait;
use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::accounts::address::AccountAddress;

/// Opaque reference to key material held by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(Uuid);

impl KeyHandle {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Signing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("unknown key handle")]
    UnknownHandle,
}

/// A raw transaction plus its signature and the signing public key,
/// ready for node submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub signature: Vec<u8>,
    pub public_key: Vec<u8>,
}

/// Boundary trait for key generation and transaction signing.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Generate a fresh key pair, returning its handle and the derived
    /// account address.
    async fn generate(&self) -> (KeyHandle, AccountAddress);

    /// Sign raw transaction bytes with the keyed material.
    async fn sign(&self, handle: &KeyHandle, raw_tx: &[u8]) -> Result<SignedTransaction, KeyError>;
}

/// In-memory provider for development and tests.
///
/// Addresses and signatures are derived deterministically from a random
/// per-key seed via SHA-256, so signing is reproducible within a test
/// without shipping real signature primitives in this crate.
#[derive(Default)]
pub struct DevKeyProvider {
    seeds: DashMap<KeyHandle, [u8; 32]>,
}

impl DevKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn public_key(seed: &[u8; 32]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(b"public");
        hasher.finalize().to_vec()
    }
}

#[async_trait]
impl KeyProvider for DevKeyProvider {
    async fn generate(&self) -> (KeyHandle, AccountAddress) {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);

        let public_key = Self::public_key(&seed);
        let mut hasher = Sha256::new();
        hasher.update(&public_key);
        hasher.update([0x00]); // single-key authentication scheme byte
        let digest = hasher.finalize();

        let mut address = [0u8; 32];
        address.copy_from_slice(&digest);

        let handle = KeyHandle::random();
        self.seeds.insert(handle, seed);
        (handle, AccountAddress::new(address))
    }

    async fn sign(&self, handle: &KeyHandle, raw_tx: &[u8]) -> Result<SignedTransaction, KeyError> {
        let seed = self
            .seeds
            .get(handle)
            .map(|r| *r.value())
            .ok_or(KeyError::UnknownHandle)?;

        // 64-byte deterministic signature stand-in.
        let mut first = Sha256::new();
        first.update(seed);
        first.update(raw_tx);
        let mut second = Sha256::new();
        second.update(raw_tx);
        second.update(seed);

        let mut signature = first.finalize().to_vec();
        signature.extend_from_slice(&second.finalize());

        Ok(SignedTransaction {
            raw: raw_tx.to_vec(),
            signature,
            public_key: Self::public_key(&seed),
        })
    }
}
