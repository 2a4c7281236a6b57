//! On-chain registry of Guatemalan properties. One token per RGP registry
//! number; ownership moves only after both a notary and a registry officer
//! approve the transfer.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, Address, Env, String, Vec,
};

use crate::BPS_DENOMINATOR;

pub const DEFAULT_TOKENIZATION_FEE_USD: u64 = 100;
pub const DEFAULT_TRANSFER_FEE_BPS: u32 = 50;
pub const MAX_TRANSFER_FEE_BPS: u32 = 200;

/// Residential, Commercial, Industrial, Agricultural, Mixed.
pub const PROPERTY_TYPE_COUNT: u32 = 5;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    NotVerifiedNotary = 4,
    Paused = 5,
    /// "Property already tokenized"
    AlreadyTokenized = 6,
    PropertyNotFound = 7,
    /// "Fee too high"
    FeeTooHigh = 8,
    NotOwner = 9,
    Encumbered = 10,
    TransferAlreadyPending = 11,
    /// "No pending transfer"
    NoPendingTransfer = 12,
    SelfTransfer = 13,
    AlreadyApproved = 14,
    InvalidPropertyType = 15,
    InvalidInput = 16,
    /// Notary and registry approvals must come from different accounts.
    SameApprover = 17,
    Overflow = 18,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Notary,
    Registry,
}

/// Title data supplied by the notary when a property is tokenized.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyInput {
    pub registry_number: String,
    pub cadastral_reference: String,
    pub municipality: String,
    pub zone: String,
    pub area_sq_meters: u64,
    pub construction_sq_meters: u64,
    pub property_type: u32,
    pub document_hash: String,
    pub valuation_usd: u64,
    pub valuation_gtq: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyRecord {
    pub token_id: u64,
    pub registry_number: String,
    pub cadastral_reference: String,
    pub municipality: String,
    pub zone: String,
    pub area_sq_meters: u64,
    pub construction_sq_meters: u64,
    pub property_type: u32,
    pub current_owner: Address,
    pub document_hash: String,
    pub valuation_usd: u64,
    pub valuation_gtq: u64,
    pub is_verified: bool,
    pub has_encumbrance: bool,
    pub verifying_notary: Address,
    pub tokenized_at: u64,
    pub pending_transfer_to: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub document_hash: String,
    /// Transfer fee owed off-chain, in USD, fixed when the request is made.
    pub fee_usd: u64,
    pub requested_at: u64,
    pub notary_approval: Option<Address>,
    pub registry_approval: Option<Address>,
}

#[contracttype]
#[derive(Clone)]
pub enum RegistryKey {
    FeeRecipient,
    TokenizationFeeUsd,
    TransferFeeBps,
    Paused,
    TokenCounter,
    Role(Role, Address),
    VerifiedNotary(Address),
    Property(u64),
    RegistryNumber(String),
    OwnerTokens(Address),
    Transfer(u64),
}

#[contract]
pub struct PropertyRegistry;

fn require_initialized(env: &Env) -> Result<(), RegistryError> {
    if env.storage().instance().has(&RegistryKey::FeeRecipient) {
        Ok(())
    } else {
        Err(RegistryError::NotInitialized)
    }
}

fn role_granted(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .instance()
        .get(&RegistryKey::Role(role, account.clone()))
        .unwrap_or(false)
}

fn require_role(env: &Env, role: Role, account: &Address) -> Result<(), RegistryError> {
    require_initialized(env)?;
    account.require_auth();
    if !role_granted(env, role, account) {
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

fn notary_verified(env: &Env, notary: &Address) -> bool {
    env.storage()
        .instance()
        .get(&RegistryKey::VerifiedNotary(notary.clone()))
        .unwrap_or(false)
}

/// Minting and transfer approvals need both the role and a place on the
/// verified list.
fn require_verified_notary(env: &Env, notary: &Address) -> Result<(), RegistryError> {
    require_role(env, Role::Notary, notary)?;
    if !notary_verified(env, notary) {
        return Err(RegistryError::NotVerifiedNotary);
    }
    Ok(())
}

fn require_not_paused(env: &Env) -> Result<(), RegistryError> {
    if env.storage().instance().get(&RegistryKey::Paused).unwrap_or(false) {
        return Err(RegistryError::Paused);
    }
    Ok(())
}

fn load_property(env: &Env, token_id: u64) -> Result<PropertyRecord, RegistryError> {
    env.storage()
        .persistent()
        .get(&RegistryKey::Property(token_id))
        .ok_or(RegistryError::PropertyNotFound)
}

fn save_property(env: &Env, record: &PropertyRecord) {
    env.storage()
        .persistent()
        .set(&RegistryKey::Property(record.token_id), record);
}

fn owner_tokens(env: &Env, owner: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&RegistryKey::OwnerTokens(owner.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn add_owner_token(env: &Env, owner: &Address, token_id: u64) {
    let mut tokens = owner_tokens(env, owner);
    tokens.push_back(token_id);
    env.storage()
        .persistent()
        .set(&RegistryKey::OwnerTokens(owner.clone()), &tokens);
}

fn remove_owner_token(env: &Env, owner: &Address, token_id: u64) {
    let mut tokens = owner_tokens(env, owner);
    if let Some(index) = tokens.first_index_of(token_id) {
        tokens.remove(index);
    }
    env.storage()
        .persistent()
        .set(&RegistryKey::OwnerTokens(owner.clone()), &tokens);
}

fn load_transfer(env: &Env, token_id: u64) -> Result<TransferRequest, RegistryError> {
    env.storage()
        .persistent()
        .get(&RegistryKey::Transfer(token_id))
        .ok_or(RegistryError::NoPendingTransfer)
}

/// Stores the approval, or completes the transfer once both sides signed.
fn record_approval(
    env: &Env,
    token_id: u64,
    request: TransferRequest,
) -> Result<bool, RegistryError> {
    if request.notary_approval.is_some() && request.notary_approval == request.registry_approval {
        return Err(RegistryError::SameApprover);
    }
    if request.notary_approval.is_none() || request.registry_approval.is_none() {
        env.storage()
            .persistent()
            .set(&RegistryKey::Transfer(token_id), &request);
        return Ok(false);
    }

    let mut record = load_property(env, token_id)?;
    if record.has_encumbrance {
        return Err(RegistryError::Encumbered);
    }

    remove_owner_token(env, &request.from, token_id);
    add_owner_token(env, &request.to, token_id);

    record.current_owner = request.to.clone();
    record.pending_transfer_to = None;
    save_property(env, &record);
    env.storage().persistent().remove(&RegistryKey::Transfer(token_id));

    env.events().publish(
        (symbol_short!("xfer_done"), token_id),
        (request.from, request.to, request.fee_usd),
    );

    Ok(true)
}

#[contractimpl]
impl PropertyRegistry {
    /// Sets the fee recipient and makes `admin` the first administrator.
    pub fn initialize(env: Env, admin: Address, fee_recipient: Address) -> Result<(), RegistryError> {
        if env.storage().instance().has(&RegistryKey::FeeRecipient) {
            return Err(RegistryError::AlreadyInitialized);
        }
        admin.require_auth();

        let storage = env.storage().instance();
        storage.set(&RegistryKey::FeeRecipient, &fee_recipient);
        storage.set(&RegistryKey::TokenizationFeeUsd, &DEFAULT_TOKENIZATION_FEE_USD);
        storage.set(&RegistryKey::TransferFeeBps, &DEFAULT_TRANSFER_FEE_BPS);
        storage.set(&RegistryKey::Paused, &false);
        storage.set(&RegistryKey::TokenCounter, &0u64);
        storage.set(&RegistryKey::Role(Role::Admin, admin), &true);

        Ok(())
    }

    // Access control

    pub fn grant_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage()
            .instance()
            .set(&RegistryKey::Role(role, account.clone()), &true);
        env.events()
            .publish((symbol_short!("role_add"), account), role);
        Ok(())
    }

    pub fn revoke_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage()
            .instance()
            .remove(&RegistryKey::Role(role, account.clone()));
        env.events()
            .publish((symbol_short!("role_del"), account), role);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        role_granted(&env, role, &account)
    }

    pub fn add_verified_notary(env: Env, admin: Address, notary: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage()
            .instance()
            .set(&RegistryKey::VerifiedNotary(notary), &true);
        Ok(())
    }

    pub fn remove_verified_notary(env: Env, admin: Address, notary: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage()
            .instance()
            .remove(&RegistryKey::VerifiedNotary(notary));
        Ok(())
    }

    pub fn is_verified_notary(env: Env, notary: Address) -> bool {
        notary_verified(&env, &notary)
    }

    // Fees

    pub fn update_fees(
        env: Env,
        admin: Address,
        tokenization_fee_usd: u64,
        transfer_fee_bps: u32,
    ) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        if transfer_fee_bps > MAX_TRANSFER_FEE_BPS {
            return Err(RegistryError::FeeTooHigh);
        }

        let storage = env.storage().instance();
        storage.set(&RegistryKey::TokenizationFeeUsd, &tokenization_fee_usd);
        storage.set(&RegistryKey::TransferFeeBps, &transfer_fee_bps);
        Ok(())
    }

    pub fn tokenization_fee_usd(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&RegistryKey::TokenizationFeeUsd)
            .unwrap_or(DEFAULT_TOKENIZATION_FEE_USD)
    }

    pub fn transfer_fee_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&RegistryKey::TransferFeeBps)
            .unwrap_or(DEFAULT_TRANSFER_FEE_BPS)
    }

    pub fn fee_recipient(env: Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&RegistryKey::FeeRecipient)
            .ok_or(RegistryError::NotInitialized)
    }

    // Emergency stop

    pub fn pause(env: Env, admin: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage().instance().set(&RegistryKey::Paused, &true);
        Ok(())
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), RegistryError> {
        require_role(&env, Role::Admin, &admin)?;
        env.storage().instance().set(&RegistryKey::Paused, &false);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        env.storage().instance().get(&RegistryKey::Paused).unwrap_or(false)
    }

    // Tokenization

    /// Mints the token for a property and returns its id. Ids start at 1.
    pub fn tokenize_property(
        env: Env,
        notary: Address,
        input: PropertyInput,
        owner: Address,
    ) -> Result<u64, RegistryError> {
        require_not_paused(&env)?;
        require_verified_notary(&env, &notary)?;

        if input.registry_number.is_empty() {
            return Err(RegistryError::InvalidInput);
        }
        if input.property_type >= PROPERTY_TYPE_COUNT {
            return Err(RegistryError::InvalidPropertyType);
        }

        let registry_key = RegistryKey::RegistryNumber(input.registry_number.clone());
        if env.storage().persistent().has(&registry_key) {
            return Err(RegistryError::AlreadyTokenized);
        }

        let token_id: u64 = env
            .storage()
            .instance()
            .get::<_, u64>(&RegistryKey::TokenCounter)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&RegistryKey::TokenCounter, &token_id);

        let record = PropertyRecord {
            token_id,
            registry_number: input.registry_number,
            cadastral_reference: input.cadastral_reference,
            municipality: input.municipality,
            zone: input.zone,
            area_sq_meters: input.area_sq_meters,
            construction_sq_meters: input.construction_sq_meters,
            property_type: input.property_type,
            current_owner: owner.clone(),
            document_hash: input.document_hash,
            valuation_usd: input.valuation_usd,
            valuation_gtq: input.valuation_gtq,
            is_verified: true,
            has_encumbrance: false,
            verifying_notary: notary.clone(),
            tokenized_at: env.ledger().timestamp(),
            pending_transfer_to: None,
        };

        save_property(&env, &record);
        env.storage().persistent().set(&registry_key, &token_id);
        add_owner_token(&env, &owner, token_id);

        env.events().publish(
            (symbol_short!("tokenized"), token_id),
            (record.registry_number, owner, notary),
        );

        Ok(token_id)
    }

    // Views

    pub fn get_property(env: Env, token_id: u64) -> Result<PropertyRecord, RegistryError> {
        load_property(&env, token_id)
    }

    pub fn token_by_registry_number(env: Env, registry_number: String) -> Result<u64, RegistryError> {
        env.storage()
            .persistent()
            .get(&RegistryKey::RegistryNumber(registry_number))
            .ok_or(RegistryError::PropertyNotFound)
    }

    pub fn owner_of(env: Env, token_id: u64) -> Result<Address, RegistryError> {
        Ok(load_property(&env, token_id)?.current_owner)
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        owner_tokens(&env, &owner).len()
    }

    pub fn owner_properties(env: Env, owner: Address) -> Vec<u64> {
        owner_tokens(&env, &owner)
    }

    pub fn get_transfer_request(env: Env, token_id: u64) -> Option<TransferRequest> {
        env.storage().persistent().get(&RegistryKey::Transfer(token_id))
    }

    // Property management

    pub fn update_valuation(
        env: Env,
        notary: Address,
        token_id: u64,
        valuation_usd: u64,
        valuation_gtq: u64,
    ) -> Result<(), RegistryError> {
        require_verified_notary(&env, &notary)?;

        let mut record = load_property(&env, token_id)?;
        record.valuation_usd = valuation_usd;
        record.valuation_gtq = valuation_gtq;
        save_property(&env, &record);

        env.events().publish(
            (symbol_short!("valuation"), token_id),
            (valuation_usd, valuation_gtq),
        );
        Ok(())
    }

    pub fn update_encumbrance(
        env: Env,
        registry: Address,
        token_id: u64,
        has_encumbrance: bool,
    ) -> Result<(), RegistryError> {
        require_role(&env, Role::Registry, &registry)?;

        let mut record = load_property(&env, token_id)?;
        record.has_encumbrance = has_encumbrance;
        save_property(&env, &record);

        env.events()
            .publish((symbol_short!("encumber"), token_id), has_encumbrance);
        Ok(())
    }

    // Transfers

    pub fn request_transfer(
        env: Env,
        owner: Address,
        token_id: u64,
        to: Address,
        document_hash: String,
    ) -> Result<(), RegistryError> {
        require_not_paused(&env)?;
        owner.require_auth();

        let mut record = load_property(&env, token_id)?;
        if record.current_owner != owner {
            return Err(RegistryError::NotOwner);
        }
        if to == owner {
            return Err(RegistryError::SelfTransfer);
        }
        if record.has_encumbrance {
            return Err(RegistryError::Encumbered);
        }
        if record.pending_transfer_to.is_some() {
            return Err(RegistryError::TransferAlreadyPending);
        }

        let fee_bps = Self::transfer_fee_bps(env.clone()) as u64;
        let fee_usd = record
            .valuation_usd
            .checked_mul(fee_bps)
            .ok_or(RegistryError::Overflow)?
            / BPS_DENOMINATOR as u64;
        let request = TransferRequest {
            from: owner.clone(),
            to: to.clone(),
            document_hash,
            fee_usd,
            requested_at: env.ledger().timestamp(),
            notary_approval: None,
            registry_approval: None,
        };

        record.pending_transfer_to = Some(to.clone());
        save_property(&env, &record);
        env.storage()
            .persistent()
            .set(&RegistryKey::Transfer(token_id), &request);

        env.events()
            .publish((symbol_short!("xfer_req"), token_id), (owner, to));
        Ok(())
    }

    /// Returns true when this approval completed the transfer.
    pub fn approve_transfer_as_notary(
        env: Env,
        notary: Address,
        token_id: u64,
    ) -> Result<bool, RegistryError> {
        require_not_paused(&env)?;
        require_verified_notary(&env, &notary)?;

        let mut request = load_transfer(&env, token_id)?;
        if request.notary_approval.is_some() {
            return Err(RegistryError::AlreadyApproved);
        }
        request.notary_approval = Some(notary.clone());

        env.events()
            .publish((symbol_short!("xfer_ok"), token_id), (Role::Notary, notary));
        record_approval(&env, token_id, request)
    }

    /// Returns true when this approval completed the transfer.
    pub fn approve_transfer_as_registry(
        env: Env,
        registry: Address,
        token_id: u64,
    ) -> Result<bool, RegistryError> {
        require_not_paused(&env)?;
        require_role(&env, Role::Registry, &registry)?;

        let mut request = load_transfer(&env, token_id)?;
        if request.registry_approval.is_some() {
            return Err(RegistryError::AlreadyApproved);
        }
        request.registry_approval = Some(registry.clone());

        env.events()
            .publish((symbol_short!("xfer_ok"), token_id), (Role::Registry, registry));
        record_approval(&env, token_id, request)
    }

    pub fn cancel_transfer(env: Env, owner: Address, token_id: u64) -> Result<(), RegistryError> {
        owner.require_auth();

        let mut record = load_property(&env, token_id)?;
        if record.current_owner != owner {
            return Err(RegistryError::NotOwner);
        }
        load_transfer(&env, token_id)?;

        record.pending_transfer_to = None;
        save_property(&env, &record);
        env.storage().persistent().remove(&RegistryKey::Transfer(token_id));

        env.events()
            .publish((symbol_short!("xfer_off"), token_id), owner);
        Ok(())
    }
}
