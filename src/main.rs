use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{info, Instrument};

use stock_reconciler::domain::{
    Direction, DraftLine, NewPartner, OrderDraft, OrderKind, PartnerKind, PartnerPatch, PartnerSelection, ProductCreate,
    ProductPatch,
};
use stock_reconciler::{setup_tracing, BackOfficeSystem, ReconcilerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ReconcilerConfig::load().context("loading configuration")?;
    // Setup tracing once for the entire application
    setup_tracing(&config);

    info!("Starting back office");
    let system = BackOfficeSystem::start(&config);

    let paint = system
        .product_client
        .create_product(ProductCreate::new("Wall paint", "WP-4L").with_initial_stock(10))
        .await?;
    let ladder = system
        .product_client
        .create_product(ProductCreate::new("Ladder", "L-3M").with_initial_stock(20))
        .await?;
    let supplier = system
        .partner_client
        .create_partner(NewPartner::quick("Paint Supplies Ltd", ""))
        .await?;
    let supplier = system
        .partner_client
        .update_partner(
            supplier,
            PartnerPatch {
                kind: Some(PartnerKind::Supplier),
                contact: Some("orders@paintsupplies.example".into()),
                ..Default::default()
            },
        )
        .await?
        .id;
    system
        .product_client
        .update_product(
            paint.clone(),
            ProductPatch {
                name: Some("Wall paint 4L".into()),
                ..Default::default()
            },
        )
        .await?;

    let span = tracing::info_span!("purchase");
    async {
        let draft = OrderDraft::new("P-0001", OrderKind::Purchase)
            .partner(PartnerSelection::Existing(supplier.clone()))
            .line(DraftLine::new(paint.clone(), 5, Decimal::new(1250, 2)));
        let order = system.reconciler.create(draft).await?;
        info!(order_id = %order.id(), total = %order.total(), "Purchase recorded");
        anyhow::Ok(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("loan");
    async {
        let draft = OrderDraft::new("L-0001", OrderKind::Loan(Direction::Outbound))
            .partner(PartnerSelection::new_named("Neighbour"))
            .line(DraftLine::new(ladder.clone(), 2, Decimal::ZERO));
        let order = system.reconciler.create(draft.clone()).await?;
        info!(order_id = %order.id(), "Ladder lent");

        let mut returned = draft;
        returned.kind = OrderKind::Loan(Direction::Inbound);
        returned.partner = PartnerSelection::Existing(order.header.partner_id.clone().unwrap_or_default());
        system.reconciler.update(order.id(), returned).await?;
        info!(order_id = %order.id(), "Loan direction corrected");

        system.reconciler.delete(order.id()).await?;
        info!(order_id = %order.id(), "Loan removed");
        anyhow::Ok(())
    }
    .instrument(span)
    .await?;

    for product in system.product_client.inventory().await? {
        info!(product = %product.name, stock = product.stock, "Stock");
    }
    let stats = system.stats().await?;
    info!(orders = stats.total_orders, purchases = stats.purchases, "Order stats");

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
