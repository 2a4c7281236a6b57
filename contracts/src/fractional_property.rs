//! Splits a registered property into a fixed supply of shares sold for a
//! payment token. The platform keeps a basis-point fee on every purchase.

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, String,
};

use crate::{property_registry::PropertyRegistryClient, BPS_DENOMINATOR};

pub const DEFAULT_PLATFORM_FEE_BPS: u32 = 250;
pub const MAX_PLATFORM_FEE_BPS: u32 = 1_000;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FractionalError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    PropertyNotRegistered = 4,
    NotPropertyOwner = 5,
    AlreadyFractionalized = 6,
    InvalidShares = 7,
    InvalidPrice = 8,
    AssetNotFound = 9,
    BelowMinimumInvestment = 10,
    ExceedsAvailableShares = 11,
    FeeTooHigh = 12,
    Overflow = 13,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FractionalizeInput {
    pub registry: Address,
    pub property_token_id: u64,
    pub property_identifier: String,
    pub total_shares: u64,
    /// Price of one share in the payment token's smallest unit.
    pub share_price: i128,
    /// Minimum number of shares per purchase.
    pub minimum_investment: u64,
    pub payment_token: Address,
    pub beneficiary: Address,
    pub revenue_generating: bool,
    pub metadata_uri: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FractionalAsset {
    pub asset_id: u64,
    pub registry: Address,
    pub property_token_id: u64,
    pub property_identifier: String,
    pub total_shares: u64,
    pub shares_sold: u64,
    pub share_price: i128,
    pub minimum_investment: u64,
    pub payment_token: Address,
    pub beneficiary: Address,
    pub revenue_generating: bool,
    pub metadata_uri: String,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum FractionalKey {
    Admin,
    FeeRecipient,
    PlatformFeeBps,
    AssetCounter,
    Manager(Address),
    Asset(u64),
    AssetByProperty(Address, u64),
    Shares(u64, Address),
}

#[contract]
pub struct FractionalProperty;

fn require_admin(env: &Env, admin: &Address) -> Result<(), FractionalError> {
    let stored: Address = env
        .storage()
        .instance()
        .get(&FractionalKey::Admin)
        .ok_or(FractionalError::NotInitialized)?;
    admin.require_auth();
    if stored != *admin {
        return Err(FractionalError::Unauthorized);
    }
    Ok(())
}

fn load_asset(env: &Env, asset_id: u64) -> Result<FractionalAsset, FractionalError> {
    env.storage()
        .persistent()
        .get(&FractionalKey::Asset(asset_id))
        .ok_or(FractionalError::AssetNotFound)
}

fn holding(env: &Env, asset_id: u64, holder: &Address) -> u64 {
    env.storage()
        .persistent()
        .get(&FractionalKey::Shares(asset_id, holder.clone()))
        .unwrap_or(0)
}

/// Splits `cost` into the platform cut and the beneficiary's share.
pub fn split_payment(cost: i128, fee_bps: u32) -> Result<(i128, i128), FractionalError> {
    let fee = cost
        .checked_mul(fee_bps as i128)
        .ok_or(FractionalError::Overflow)?
        / BPS_DENOMINATOR as i128;
    Ok((fee, cost - fee))
}

#[contractimpl]
impl FractionalProperty {
    pub fn init(
        env: Env,
        admin: Address,
        fee_recipient: Address,
        platform_fee_bps: u32,
    ) -> Result<(), FractionalError> {
        if env.storage().instance().has(&FractionalKey::Admin) {
            return Err(FractionalError::AlreadyInitialized);
        }
        if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(FractionalError::FeeTooHigh);
        }
        admin.require_auth();

        let storage = env.storage().instance();
        storage.set(&FractionalKey::Admin, &admin);
        storage.set(&FractionalKey::FeeRecipient, &fee_recipient);
        storage.set(&FractionalKey::PlatformFeeBps, &platform_fee_bps);
        storage.set(&FractionalKey::AssetCounter, &0u64);
        storage.set(&FractionalKey::Manager(admin), &true);
        Ok(())
    }

    pub fn set_manager(
        env: Env,
        admin: Address,
        manager: Address,
        enabled: bool,
    ) -> Result<(), FractionalError> {
        require_admin(&env, &admin)?;
        env.storage()
            .instance()
            .set(&FractionalKey::Manager(manager), &enabled);
        Ok(())
    }

    pub fn is_manager(env: Env, account: Address) -> bool {
        env.storage()
            .instance()
            .get(&FractionalKey::Manager(account))
            .unwrap_or(false)
    }

    pub fn set_platform_fee(env: Env, admin: Address, fee_bps: u32) -> Result<(), FractionalError> {
        require_admin(&env, &admin)?;
        if fee_bps > MAX_PLATFORM_FEE_BPS {
            return Err(FractionalError::FeeTooHigh);
        }
        env.storage()
            .instance()
            .set(&FractionalKey::PlatformFeeBps, &fee_bps);
        Ok(())
    }

    pub fn platform_fee_bps(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&FractionalKey::PlatformFeeBps)
            .unwrap_or(DEFAULT_PLATFORM_FEE_BPS)
    }

    /// Opens a share sale for a registered property. The beneficiary must
    /// own the token in the referenced registry.
    pub fn fractionalize_property(
        env: Env,
        manager: Address,
        input: FractionalizeInput,
    ) -> Result<u64, FractionalError> {
        manager.require_auth();
        if !Self::is_manager(env.clone(), manager.clone()) {
            return Err(FractionalError::Unauthorized);
        }

        if input.total_shares == 0
            || input.minimum_investment == 0
            || input.minimum_investment > input.total_shares
        {
            return Err(FractionalError::InvalidShares);
        }
        if input.share_price <= 0 {
            return Err(FractionalError::InvalidPrice);
        }

        let property_key = FractionalKey::AssetByProperty(input.registry.clone(), input.property_token_id);
        if env.storage().persistent().has(&property_key) {
            return Err(FractionalError::AlreadyFractionalized);
        }

        let registry = PropertyRegistryClient::new(&env, &input.registry);
        let owner = match registry.try_owner_of(&input.property_token_id) {
            Ok(Ok(owner)) => owner,
            _ => return Err(FractionalError::PropertyNotRegistered),
        };
        if owner != input.beneficiary {
            return Err(FractionalError::NotPropertyOwner);
        }

        let asset_id: u64 = env
            .storage()
            .instance()
            .get::<_, u64>(&FractionalKey::AssetCounter)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&FractionalKey::AssetCounter, &asset_id);

        let asset = FractionalAsset {
            asset_id,
            registry: input.registry,
            property_token_id: input.property_token_id,
            property_identifier: input.property_identifier,
            total_shares: input.total_shares,
            shares_sold: 0,
            share_price: input.share_price,
            minimum_investment: input.minimum_investment,
            payment_token: input.payment_token,
            beneficiary: input.beneficiary,
            revenue_generating: input.revenue_generating,
            metadata_uri: input.metadata_uri,
            created_at: env.ledger().timestamp(),
        };

        env.storage().persistent().set(&FractionalKey::Asset(asset_id), &asset);
        env.storage().persistent().set(&property_key, &asset_id);

        env.events().publish(
            (symbol_short!("fraction"), asset_id),
            (asset.property_token_id, asset.total_shares, asset.share_price),
        );

        Ok(asset_id)
    }

    /// Buys `shares` of an asset and returns the buyer's new holding.
    pub fn buy_shares(
        env: Env,
        buyer: Address,
        asset_id: u64,
        shares: u64,
    ) -> Result<u64, FractionalError> {
        buyer.require_auth();

        let mut asset = load_asset(&env, asset_id)?;
        if shares < asset.minimum_investment {
            return Err(FractionalError::BelowMinimumInvestment);
        }
        let sold = asset
            .shares_sold
            .checked_add(shares)
            .ok_or(FractionalError::Overflow)?;
        if sold > asset.total_shares {
            return Err(FractionalError::ExceedsAvailableShares);
        }

        let cost = asset
            .share_price
            .checked_mul(shares as i128)
            .ok_or(FractionalError::Overflow)?;
        let (fee, proceeds) = split_payment(cost, Self::platform_fee_bps(env.clone()))?;

        let payment = token::Client::new(&env, &asset.payment_token);
        if fee > 0 {
            let fee_recipient: Address = env
                .storage()
                .instance()
                .get(&FractionalKey::FeeRecipient)
                .ok_or(FractionalError::NotInitialized)?;
            payment.transfer(&buyer, &fee_recipient, &fee);
        }
        payment.transfer(&buyer, &asset.beneficiary, &proceeds);

        asset.shares_sold = sold;
        env.storage().persistent().set(&FractionalKey::Asset(asset_id), &asset);

        let held = holding(&env, asset_id, &buyer) + shares;
        env.storage()
            .persistent()
            .set(&FractionalKey::Shares(asset_id, buyer.clone()), &held);

        env.events()
            .publish((symbol_short!("bought"), asset_id), (buyer, shares, cost));

        Ok(held)
    }

    // Views

    pub fn get_asset(env: Env, asset_id: u64) -> Result<FractionalAsset, FractionalError> {
        load_asset(&env, asset_id)
    }

    pub fn asset_for_property(
        env: Env,
        registry: Address,
        property_token_id: u64,
    ) -> Option<u64> {
        env.storage()
            .persistent()
            .get(&FractionalKey::AssetByProperty(registry, property_token_id))
    }

    pub fn shares_of(env: Env, asset_id: u64, holder: Address) -> u64 {
        holding(&env, asset_id, &holder)
    }

    pub fn shares_available(env: Env, asset_id: u64) -> Result<u64, FractionalError> {
        let asset = load_asset(&env, asset_id)?;
        Ok(asset.total_shares - asset.shares_sold)
    }

    /// Sold fraction of the supply in basis points, 10 000 when sold out.
    pub fn funding_progress_bps(env: Env, asset_id: u64) -> Result<u32, FractionalError> {
        let asset = load_asset(&env, asset_id)?;
        Ok((asset.shares_sold as u128 * BPS_DENOMINATOR as u128 / asset.total_shares as u128) as u32)
    }
}
