use std::{str::FromStr, sync::Arc};

use anyhow::Result;
use boxoffice_core::{CreateTicketOption, PurchaseTicketOption, ServiceError, StorageEngine, TicketOption, TicketOptionId, TicketOptionService};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub fn service(storage: impl StorageEngine + 'static) -> TicketOptionService { TicketOptionService::new(Arc::new(storage)) }

pub async fn create_option(service: &TicketOptionService, allocation: i64) -> Result<TicketOption> {
    Ok(service.create_ticket_option(CreateTicketOption { name: "Concert".into(), description: "Main stage".into(), allocation }).await?)
}

pub fn purchase(id: &TicketOptionId, user_id: &str, quantity: i64) -> PurchaseTicketOption {
    PurchaseTicketOption { ticket_option_id: id.clone(), user_id: user_id.into(), quantity }
}

pub async fn allocation(service: &TicketOptionService, id: &TicketOptionId) -> Result<i64> { Ok(service.get_ticket_option(id).await?.allocation) }

/// Allocation 10: buy 3, fail 10, buy 7, fail 1.
#[allow(unused)]
pub async fn concert_scenario(service: &TicketOptionService) -> Result<()> {
    let option = create_option(service, 10).await?;
    assert_eq!(option.allocation, 10);

    let first = service.purchase_ticket_option(purchase(&option.id, "alice", 3)).await?;
    assert_eq!(first.ticket_ids.len(), 3);
    assert_eq!(allocation(service, &option.id).await?, 7);

    let rejected = service.purchase_ticket_option(purchase(&option.id, "bob", 10)).await;
    assert!(matches!(rejected, Err(ServiceError::OverAllocated { requested: 10 })), "{rejected:?}");
    assert_eq!(allocation(service, &option.id).await?, 7);

    let second = service.purchase_ticket_option(purchase(&option.id, "carol", 7)).await?;
    assert_eq!(second.ticket_ids.len(), 7);
    assert_ne!(first.purchase_id, second.purchase_id);
    assert_eq!(allocation(service, &option.id).await?, 0);

    let sold_out = service.purchase_ticket_option(purchase(&option.id, "dave", 1)).await;
    assert!(matches!(sold_out, Err(ServiceError::OverAllocated { requested: 1 })), "{sold_out:?}");
    assert_eq!(allocation(service, &option.id).await?, 0);
    Ok(())
}

/// `attempts` concurrent single-ticket purchases against an allocation of `allocation`.
#[allow(unused)]
pub async fn concurrent_single_purchases(service: &TicketOptionService, allocation_size: i64, attempts: usize) -> Result<()> {
    let option = create_option(service, allocation_size).await?;

    let handles = (0..attempts).map(|i| {
        let service = service.clone();
        let id = option.id.clone();
        tokio::spawn(async move { service.purchase_ticket_option(purchase(&id, &format!("user-{i}"), 1)).await })
    });

    let mut succeeded: i64 = 0;
    let mut ticket_ids = std::collections::HashSet::new();
    for result in futures::future::join_all(handles).await {
        match result? {
            Ok(fulfillment) => {
                succeeded += 1;
                ticket_ids.extend(fulfillment.ticket_ids);
            }
            Err(ServiceError::OverAllocated { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let expected = allocation_size.min(attempts as i64);
    assert_eq!(succeeded, expected);
    assert_eq!(ticket_ids.len() as i64, expected);
    assert_eq!(allocation(service, &option.id).await?, allocation_size - expected);
    Ok(())
}

/// The same purchase twice is two purchases.
#[allow(unused)]
pub async fn repeated_purchase_is_not_idempotent(service: &TicketOptionService) -> Result<()> {
    let option = create_option(service, 10).await?;
    let request = purchase(&option.id, "alice", 2);

    let first = service.purchase_ticket_option(request.clone()).await?;
    let second = service.purchase_ticket_option(request).await?;
    assert_ne!(first.purchase_id, second.purchase_id);
    assert!(first.ticket_ids.iter().all(|id| !second.ticket_ids.contains(id)));
    assert_eq!(allocation(service, &option.id).await?, 6);
    Ok(())
}

#[allow(unused)]
pub async fn unknown_option_is_not_found(service: &TicketOptionService) -> Result<()> {
    let missing = TicketOptionId::generate();
    assert!(matches!(service.get_ticket_option(&missing).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(service.purchase_ticket_option(purchase(&missing, "alice", 1)).await, Err(ServiceError::NotFound(_))));
    Ok(())
}
