//! Entry-function requests and the raw transaction envelope.

use crate::accounts::AccountAddress;
use crate::config::TransactionConfig;
use crate::marshal::{uleb128, EncodedArgument, TxArg, TypeTag};

/// A fully described entry-function call, before marshalling. Built
/// transiently per submission; never persisted.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub sender: AccountAddress,
    pub module_address: AccountAddress,
    pub module_name: String,
    pub function_name: String,
    /// Type arguments as grammar strings, parsed during marshalling.
    pub type_args: Vec<String>,
    /// Value arguments, positionally ordered.
    pub args: Vec<TxArg>,
}

/// The signable transaction envelope: the request plus chain-ordering
/// and gas parameters.
#[derive(Debug, Clone)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub module_address: AccountAddress,
    pub module_name: String,
    pub function_name: String,
    pub type_tags: Vec<TypeTag>,
    pub encoded_args: Vec<EncodedArgument>,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

impl RawTransaction {
    pub fn from_request(
        request: &TransactionRequest,
        sequence_number: u64,
        type_tags: Vec<TypeTag>,
        encoded_args: Vec<EncodedArgument>,
        config: &TransactionConfig,
        now: u64,
        chain_id: u8,
    ) -> Self {
        Self {
            sender: request.sender,
            sequence_number,
            module_address: request.module_address,
            module_name: request.module_name.clone(),
            function_name: request.function_name.clone(),
            type_tags,
            encoded_args,
            max_gas_amount: config.max_gas_amount,
            gas_unit_price: config.gas_unit_price,
            expiration_timestamp_secs: now + config.expiration_secs,
            chain_id,
        }
    }

    /// Canonical byte form handed to the signer.
    ///
    /// Layout: sender ‖ sequence (u64 LE) ‖ module address ‖
    /// length-prefixed module and function names ‖ counted type tags ‖
    /// counted length-prefixed arguments ‖ gas fields ‖ expiration ‖
    /// chain id. Length prefixes and counts are ULEB128.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(&self.sequence_number.to_le_bytes());
        out.extend_from_slice(self.module_address.as_bytes());

        append_str(&mut out, &self.module_name);
        append_str(&mut out, &self.function_name);

        out.extend(uleb128(self.type_tags.len() as u32));
        for tag in &self.type_tags {
            out.extend(tag.encode());
        }

        out.extend(uleb128(self.encoded_args.len() as u32));
        for arg in &self.encoded_args {
            out.extend(uleb128(arg.len() as u32));
            out.extend_from_slice(arg.as_slice());
        }

        out.extend_from_slice(&self.max_gas_amount.to_le_bytes());
        out.extend_from_slice(&self.gas_unit_price.to_le_bytes());
        out.extend_from_slice(&self.expiration_timestamp_secs.to_le_bytes());
        out.push(self.chain_id);

        out
    }
}

fn append_str(out: &mut Vec<u8>, s: &str) {
    out.extend(uleb128(s.len() as u32));
    out.extend_from_slice(s.as_bytes());
}
