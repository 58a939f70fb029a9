use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{Game, Membership, Offer, OfferActivation, Package};

#[instrument(skip(gateway))]
pub(crate) async fn get_games(gateway: &Gateway) -> Result<Vec<Game>> {
    let games: Vec<Game> = gateway.get("/games").await?;
    debug!(count = games.len(), "fetched games");
    Ok(games)
}

#[instrument(skip(gateway))]
pub(crate) async fn get_packages(gateway: &Gateway) -> Result<Vec<Package>> {
    let packages: Vec<Package> = gateway.get("/packages").await?;
    debug!(count = packages.len(), "fetched packages");
    Ok(packages)
}

#[instrument(skip(gateway))]
pub(crate) async fn get_memberships(gateway: &Gateway) -> Result<Vec<Membership>> {
    let memberships: Vec<Membership> = gateway.get("/memberships").await?;
    debug!(count = memberships.len(), "fetched memberships");
    Ok(memberships)
}

#[instrument(skip(gateway))]
pub(crate) async fn get_offers(gateway: &Gateway) -> Result<Vec<Offer>> {
    let offers: Vec<Offer> = gateway.get("/offer").await?;
    debug!(count = offers.len(), "fetched offers");
    Ok(offers)
}

/// PATCH the offer's `isActive` flag, then refetch the full list.
/// A failed PATCH returns early and triggers no refetch.
#[instrument(skip(gateway, offer), fields(offer_id = %offer.id))]
pub(crate) async fn set_offer_active(
    gateway: &Gateway,
    offer: &Offer,
    is_active: bool,
) -> Result<Vec<Offer>> {
    gateway
        .command(
            reqwest::Method::PATCH,
            &format!("/offer/{}", offer.id),
            Some(&OfferActivation { is_active }),
        )
        .await?;
    info!(is_active, "offer activation changed");
    get_offers(gateway).await
}
