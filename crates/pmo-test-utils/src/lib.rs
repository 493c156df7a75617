//! Testing utilities for the PMO workspace
//!
//! A deterministic in-memory ledger that stands in for the remote network:
//! it hosts proxied contracts (a vault and a strategy), an owner-gated
//! proxy admin, a token with balances, and a role registry. Tests drive the
//! real orchestrator API against it and then inspect or perturb contract
//! state directly through the harness methods.

#![allow(missing_docs)]

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use pmo_ledger::{
    Address, CallData, ContractRef, LedgerClient, LedgerError, RegistryError, RoleRegistry, Value,
};
use std::collections::HashMap;

pub const VAULT_INTERFACE: &str = "Vault";
pub const STRATEGY_INTERFACE: &str = "Strategy";
pub const PROXY_ADMIN_INTERFACE: &str = "ProxyAdmin";
pub const TOKEN_INTERFACE: &str = "Token";

pub const MAX_PERFORMANCE_FEE: u128 = 3_000;
pub const MAX_WITHDRAWAL_FEE: u128 = 200;
pub const MAX_MANAGEMENT_FEE: u128 = 200;
pub const DEFAULT_TO_EARN_BPS: u128 = 9_500;

/// Deterministic test address: the index lands in the trailing bytes.
#[must_use]
pub fn addr(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address::from_bytes(bytes)
}

/// Owned field set for snapshot calls.
#[must_use]
pub fn field_set(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// A registered logic contract and the behavior it gives its proxies.
#[derive(Debug, Clone)]
pub struct Implementation {
    pub interface: String,
    /// When set, `withdrawAll` reverts with this reason.
    pub withdraw_revert: Option<String>,
    /// Accessors this implementation no longer exposes (a bad upgrade).
    pub hidden_fields: Vec<String>,
}

impl Implementation {
    #[must_use]
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            withdraw_revert: None,
            hidden_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_blocked_withdrawals(mut self, reason: impl Into<String>) -> Self {
        self.withdraw_revert = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_hidden_field(mut self, field: impl Into<String>) -> Self {
        self.hidden_fields.push(field.into());
        self
    }
}

#[derive(Debug)]
struct ProxiedContract {
    implementation: Address,
    admin: Address,
    fields: IndexMap<String, Value>,
    shares: HashMap<Address, u128>,
}

#[derive(Debug)]
enum Contract {
    Proxied(ProxiedContract),
    ProxyAdmin { owner: Address },
    Token { balances: HashMap<Address, u128> },
}

#[derive(Debug, Default)]
struct LedgerState {
    registry: HashMap<String, Address>,
    registry_outage: Option<String>,
    implementations: HashMap<Address, Implementation>,
    contracts: HashMap<Address, Contract>,
    deployed: u64,
}

/// In-memory ledger implementing [`LedgerClient`] and [`RoleRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_role(self, key: impl Into<String>, address: Address) -> Self {
        self.set_role(key, address);
        self
    }

    pub fn set_role(&self, key: impl Into<String>, address: Address) {
        self.state.lock().registry.insert(key.into(), address);
    }

    /// Make every registry lookup fail, simulating an outage.
    pub fn fail_registry(&self, reason: impl Into<String>) {
        self.state.lock().registry_outage = Some(reason.into());
    }

    pub fn register_implementation(&self, address: Address, implementation: Implementation) {
        self.state
            .lock()
            .implementations
            .insert(address, implementation);
    }

    pub fn create_proxy_admin(&self, owner: Address) -> Address {
        let mut state = self.state.lock();
        let address = next_deploy_address(&mut state);
        state.contracts.insert(address, Contract::ProxyAdmin { owner });
        address
    }

    pub fn create_token(&self) -> Address {
        let mut state = self.state.lock();
        let address = next_deploy_address(&mut state);
        state.contracts.insert(
            address,
            Contract::Token {
                balances: HashMap::new(),
            },
        );
        address
    }

    /// Overwrite a stored field on a proxied contract, bypassing any
    /// access control. Tests use this to fake state drift.
    pub fn set_field(&self, contract: Address, field: impl Into<String>, value: Value) {
        let mut state = self.state.lock();
        if let Some(Contract::Proxied(proxied)) = state.contracts.get_mut(&contract) {
            proxied.fields.insert(field.into(), value);
        }
    }

    pub fn mint_shares(&self, vault: Address, holder: Address, amount: u128) {
        let mut state = self.state.lock();
        if let Some(Contract::Proxied(proxied)) = state.contracts.get_mut(&vault) {
            *proxied.shares.entry(holder).or_insert(0) += amount;
        }
    }

    pub fn fund_token(&self, token: Address, holder: Address, amount: u128) {
        let mut state = self.state.lock();
        if let Some(Contract::Token { balances }) = state.contracts.get_mut(&token) {
            *balances.entry(holder).or_insert(0) += amount;
        }
    }

    #[must_use]
    pub fn token_balance(&self, token: Address, holder: Address) -> u128 {
        let state = self.state.lock();
        match state.contracts.get(&token) {
            Some(Contract::Token { balances }) => balances.get(&holder).copied().unwrap_or(0),
            _ => 0,
        }
    }

    #[must_use]
    pub fn share_balance(&self, vault: Address, holder: Address) -> u128 {
        let state = self.state.lock();
        match state.contracts.get(&vault) {
            Some(Contract::Proxied(proxied)) => proxied.shares.get(&holder).copied().unwrap_or(0),
            _ => 0,
        }
    }

    #[must_use]
    pub fn implementation_of(&self, proxy: Address) -> Option<Address> {
        let state = self.state.lock();
        match state.contracts.get(&proxy) {
            Some(Contract::Proxied(proxied)) => Some(proxied.implementation),
            _ => None,
        }
    }

    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.state.lock().contracts.len()
    }
}

fn next_deploy_address(state: &mut LedgerState) -> Address {
    state.deployed += 1;
    let mut bytes = [0u8; 20];
    bytes[0] = 0xd0;
    bytes[12..].copy_from_slice(&state.deployed.to_be_bytes());
    Address::from_bytes(bytes)
}

fn reverted(reason: &str) -> LedgerError {
    LedgerError::Reverted {
        reason: reason.to_string(),
    }
}

fn advertised_interface<'a>(state: &'a LedgerState, contract: &'a Contract) -> &'a str {
    match contract {
        Contract::Proxied(proxied) => state
            .implementations
            .get(&proxied.implementation)
            .map_or("", |imp| imp.interface.as_str()),
        Contract::ProxyAdmin { .. } => PROXY_ADMIN_INTERFACE,
        Contract::Token { .. } => TOKEN_INTERFACE,
    }
}

fn expect_address(call: &CallData, index: usize) -> Result<Address, LedgerError> {
    call.args
        .get(index)
        .and_then(Value::as_address)
        .ok_or_else(|| reverted("malformed argument"))
}

/// Populate a vault's storage from its initializer arguments.
///
/// Argument order mirrors the production initializer: want, governance,
/// keeper, guardian, treasury, strategist, rewards recipient, name, symbol,
/// and a four-entry fee list.
fn init_vault_fields(args: &[Value]) -> Result<IndexMap<String, Value>, LedgerError> {
    if args.len() != 10 {
        return Err(reverted("vault initializer expects 10 arguments"));
    }
    let fee_names = [
        "performanceFeeGovernance",
        "performanceFeeStrategist",
        "withdrawalFee",
        "managementFee",
    ];
    let fees = match &args[9] {
        Value::List(items) if items.len() == fee_names.len() => items.clone(),
        _ => return Err(reverted("vault initializer expects 4 fee entries")),
    };

    let mut fields = IndexMap::new();
    for (name, value) in [
        ("want", &args[0]),
        ("governance", &args[1]),
        ("keeper", &args[2]),
        ("guardian", &args[3]),
        ("treasury", &args[4]),
        ("strategist", &args[5]),
        ("rewardsRecipient", &args[6]),
    ] {
        if value.as_address().is_none() {
            return Err(reverted("vault initializer expects an address"));
        }
        fields.insert(name.to_string(), value.clone());
    }
    fields.insert("name".to_string(), args[7].clone());
    fields.insert("symbol".to_string(), args[8].clone());
    for (name, value) in fee_names.iter().zip(fees) {
        if value.as_uint().is_none() {
            return Err(reverted("vault initializer expects numeric fees"));
        }
        fields.insert((*name).to_string(), value);
    }

    fields.insert("strategy".to_string(), Value::Address(Address::ZERO));
    fields.insert("lifeTimeEarned".to_string(), Value::Uint(0));
    fields.insert("lastHarvestedAt".to_string(), Value::Uint(0));
    fields.insert("lastHarvestAmount".to_string(), Value::Uint(0));
    fields.insert("assetsAtLastHarvest".to_string(), Value::Uint(0));
    fields.insert(
        "maxPerformanceFee".to_string(),
        Value::Uint(MAX_PERFORMANCE_FEE),
    );
    fields.insert(
        "maxWithdrawalFee".to_string(),
        Value::Uint(MAX_WITHDRAWAL_FEE),
    );
    fields.insert(
        "maxManagementFee".to_string(),
        Value::Uint(MAX_MANAGEMENT_FEE),
    );
    fields.insert("toEarnBps".to_string(), Value::Uint(DEFAULT_TO_EARN_BPS));
    Ok(fields)
}

/// Populate a strategy's storage: vault plus a `[want, reward]` pair.
fn init_strategy_fields(args: &[Value]) -> Result<IndexMap<String, Value>, LedgerError> {
    if args.len() != 2 {
        return Err(reverted("strategy initializer expects 2 arguments"));
    }
    let vault = args[0]
        .as_address()
        .ok_or_else(|| reverted("strategy initializer expects a vault address"))?;
    let tokens = match &args[1] {
        Value::List(items) if items.len() == 2 => items.clone(),
        _ => return Err(reverted("strategy initializer expects [want, reward]")),
    };
    for token in &tokens {
        if token.as_address().is_none() {
            return Err(reverted("strategy initializer expects token addresses"));
        }
    }

    let mut fields = IndexMap::new();
    fields.insert("vault".to_string(), Value::Address(vault));
    fields.insert("want".to_string(), tokens[0].clone());
    fields.insert("reward".to_string(), tokens[1].clone());
    Ok(fields)
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn submit(
        &self,
        from: Address,
        target: &ContractRef,
        call: CallData,
    ) -> Result<Value, LedgerError> {
        let mut state = self.state.lock();
        let contract = state
            .contracts
            .get(&target.address)
            .ok_or(LedgerError::UnknownContract {
                address: target.address,
            })?;
        if advertised_interface(&state, contract) != target.interface {
            return Err(LedgerError::UnknownMethod {
                interface: target.interface.clone(),
                method: call.method,
            });
        }

        match contract {
            Contract::ProxyAdmin { owner } => {
                if call.method != "upgrade" {
                    return Err(LedgerError::UnknownMethod {
                        interface: target.interface.clone(),
                        method: call.method,
                    });
                }
                if from != *owner {
                    return Err(reverted("caller is not the owner"));
                }
                let proxy = expect_address(&call, 0)?;
                let new_impl = expect_address(&call, 1)?;
                if !state.implementations.contains_key(&new_impl) {
                    return Err(reverted("implementation has no code"));
                }
                let admin = target.address;
                match state.contracts.get_mut(&proxy) {
                    Some(Contract::Proxied(proxied)) if proxied.admin == admin => {
                        proxied.implementation = new_impl;
                        Ok(Value::Bool(true))
                    }
                    _ => Err(reverted("not the admin of this proxy")),
                }
            }
            Contract::Proxied(_) => {
                self.submit_proxied(&mut state, from, target.address, &call)
            }
            Contract::Token { .. } => Err(LedgerError::UnknownMethod {
                interface: target.interface.clone(),
                method: call.method,
            }),
        }
    }

    async fn read(&self, target: &ContractRef, call: CallData) -> Result<Value, LedgerError> {
        let state = self.state.lock();
        let contract = state
            .contracts
            .get(&target.address)
            .ok_or(LedgerError::UnknownContract {
                address: target.address,
            })?;
        if advertised_interface(&state, contract) != target.interface {
            return Err(LedgerError::UnknownMethod {
                interface: target.interface.clone(),
                method: call.method,
            });
        }

        let unknown = || LedgerError::UnknownMethod {
            interface: target.interface.clone(),
            method: call.method.clone(),
        };

        match contract {
            Contract::ProxyAdmin { owner } => match call.method.as_str() {
                "owner" => Ok(Value::Address(*owner)),
                _ => Err(unknown()),
            },
            Contract::Token { balances } => match call.method.as_str() {
                "balanceOf" => {
                    let holder = expect_address(&call, 0)?;
                    Ok(Value::Uint(balances.get(&holder).copied().unwrap_or(0)))
                }
                _ => Err(unknown()),
            },
            Contract::Proxied(proxied) => {
                if call.method == "balanceOf" {
                    let holder = expect_address(&call, 0)?;
                    return Ok(Value::Uint(
                        proxied.shares.get(&holder).copied().unwrap_or(0),
                    ));
                }
                let implementation = state
                    .implementations
                    .get(&proxied.implementation)
                    .ok_or_else(unknown)?;
                if implementation.hidden_fields.contains(&call.method) {
                    return Err(unknown());
                }
                proxied.fields.get(&call.method).cloned().ok_or_else(unknown)
            }
        }
    }

    async fn deploy_proxy(
        &self,
        _from: Address,
        implementation: Address,
        admin: Address,
        initializer: CallData,
    ) -> Result<Address, LedgerError> {
        let mut state = self.state.lock();
        let registered = state
            .implementations
            .get(&implementation)
            .ok_or_else(|| reverted("implementation has no code"))?;
        if initializer.method != "initialize" {
            return Err(reverted("unknown initializer"));
        }
        let fields = match registered.interface.as_str() {
            VAULT_INTERFACE => init_vault_fields(&initializer.args)?,
            STRATEGY_INTERFACE => init_strategy_fields(&initializer.args)?,
            other => return Err(reverted(&format!("no initializer for interface {other}"))),
        };

        let address = next_deploy_address(&mut state);
        state.contracts.insert(
            address,
            Contract::Proxied(ProxiedContract {
                implementation,
                admin,
                fields,
                shares: HashMap::new(),
            }),
        );
        Ok(address)
    }
}

impl InMemoryLedger {
    fn submit_proxied(
        &self,
        state: &mut LedgerState,
        from: Address,
        vault: Address,
        call: &CallData,
    ) -> Result<Value, LedgerError> {
        let proxied = match state.contracts.get(&vault) {
            Some(Contract::Proxied(p)) => p,
            _ => {
                return Err(LedgerError::UnknownContract { address: vault });
            }
        };
        let implementation = state
            .implementations
            .get(&proxied.implementation)
            .cloned()
            .ok_or_else(|| reverted("implementation has no code"))?;

        match call.method.as_str() {
            "setStrategy" => {
                let strategy = expect_address(call, 0)?;
                let governance = proxied.fields.get("governance").and_then(Value::as_address);
                if governance != Some(from) {
                    return Err(reverted("only governance"));
                }
                if let Some(Contract::Proxied(p)) = state.contracts.get_mut(&vault) {
                    p.fields
                        .insert("strategy".to_string(), Value::Address(strategy));
                }
                Ok(Value::Bool(true))
            }
            "withdrawAll" => {
                if let Some(reason) = &implementation.withdraw_revert {
                    return Err(reverted(reason));
                }
                let amount = proxied.shares.get(&from).copied().unwrap_or(0);
                if amount == 0 {
                    return Err(reverted("no shares to withdraw"));
                }
                let want = proxied
                    .fields
                    .get("want")
                    .and_then(Value::as_address)
                    .ok_or_else(|| reverted("vault has no want token"))?;

                // Debit the vault's backing balance before touching shares.
                match state.contracts.get_mut(&want) {
                    Some(Contract::Token { balances }) => {
                        let backing = balances.entry(vault).or_insert(0);
                        if *backing < amount {
                            return Err(reverted("insufficient want in vault"));
                        }
                        *backing -= amount;
                        *balances.entry(from).or_insert(0) += amount;
                    }
                    _ => return Err(reverted("want token has no code")),
                }
                if let Some(Contract::Proxied(p)) = state.contracts.get_mut(&vault) {
                    p.shares.remove(&from);
                }
                Ok(Value::Uint(amount))
            }
            _ => Err(LedgerError::UnknownMethod {
                interface: implementation.interface,
                method: call.method.clone(),
            }),
        }
    }
}

#[async_trait]
impl RoleRegistry for InMemoryLedger {
    async fn get(&self, key: &str) -> Result<Address, RegistryError> {
        let state = self.state.lock();
        if let Some(reason) = &state.registry_outage {
            return Err(RegistryError::Unavailable(reason.clone()));
        }
        state
            .registry
            .get(key)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }
}
