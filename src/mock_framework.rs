//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then answer the
//! requests it sends with helpers like [`expect_get`] or [`expect_action`].

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};

type Responder<R> = oneshot::Sender<Result<R, FrameworkError>>;

/// Creates a client whose requests arrive on the returned receiver instead
/// of a running actor.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Responder<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Responder<Vec<T>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{OrderClient, PartnerClient, ProductClient};
    use crate::domain::{NewPartner, Order, Partner, PartnerKind, Product, ProductCreate, StockSnapshot};
    use crate::error::StoreError;
    use crate::product_actor::{ProductAction, ProductActionResult};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Partner>(10);
        let client = PartnerClient::new(client);

        let create_task = tokio::spawn(async move { client.create_partner(NewPartner::quick(" Acme ", " 555-0100 ")).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Acme");
        assert_eq!(payload.contact, "555-0100");
        assert_eq!(payload.kind, PartnerKind::Client);
        responder.send(Ok("partner_1".to_string())).unwrap();

        assert_eq!(create_task.await.unwrap(), Ok("partner_1".to_string()));
    }

    #[tokio::test]
    async fn test_adjust_stock_sends_a_single_action() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(client);

        let task = tokio::spawn(async move { client.adjust_stock("product_1".into(), -3).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert_eq!(id, "product_1");
        assert!(matches!(action, ProductAction::AdjustStock(-3)));
        responder
            .send(Ok(ProductActionResult::AdjustStock(StockSnapshot { stock: 7, version: 4 })))
            .unwrap();

        assert_eq!(task.await.unwrap(), Ok(Some(7)));
    }

    #[tokio::test]
    async fn test_adjust_stock_overflow_keeps_its_meaning() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(client);

        let task = tokio::spawn(async move { client.adjust_stock("product_1".into(), 1).await });

        let (_, _, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        responder.send(Err(FrameworkError::Overflow("product_1".into()))).unwrap();

        assert_eq!(task.await.unwrap(), Err(StoreError::Overflow("product_1".into())));
    }

    #[tokio::test]
    async fn test_missing_product_maps_to_none_and_false() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(client);

        let reader = client.clone();
        let task = tokio::spawn(async move {
            let read = reader.read_stock("product_9".into()).await;
            let write = reader.write_stock("product_9".into(), 4, None).await;
            (read, write)
        });

        for _ in 0..2 {
            let (id, _, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
            responder.send(Err(FrameworkError::NotFound(id))).unwrap();
        }

        let (read, write) = task.await.unwrap();
        assert_eq!(read, Ok(None));
        assert_eq!(write, Ok(false));
    }

    #[tokio::test]
    async fn test_conflict_is_passed_through() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(client);

        let task = tokio::spawn(async move { client.write_stock("product_1".into(), 4, Some(2)).await });

        let (_, action, responder) = expect_action(&mut receiver).await.expect("Expected Action request");
        assert!(matches!(
            action,
            ProductAction::WriteStock {
                stock: 4,
                expected_version: Some(2)
            }
        ));
        responder
            .send(Err(FrameworkError::Conflict {
                id: "product_1".into(),
                expected: 2,
                actual: 3,
            }))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(StoreError::Conflict {
                id: "product_1".into(),
                expected: 2,
                actual: 3
            })
        );
    }

    #[tokio::test]
    async fn test_inventory_is_sorted_by_name() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let client = ProductClient::new(client);

        let task = tokio::spawn(async move { client.inventory().await });

        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        let mut products = Vec::new();
        for (id, name) in [("product_1", "Zebra lamp"), ("product_2", "Anchor"), ("product_3", "Mirror")] {
            let mut product = <Product as Entity>::from_create_params(id.into(), ProductCreate::new(name, "M")).unwrap();
            product.stock = 1;
            products.push(product);
        }
        responder.send(Ok(products)).unwrap();

        let names: Vec<String> = task.await.unwrap().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Anchor", "Mirror", "Zebra lamp"]);
    }

    #[tokio::test]
    async fn test_create_order_reads_back_the_stored_header() {
        use crate::domain::{NewOrder, OrderKind};
        use chrono::NaiveDate;

        let (client, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(client);

        let new_order = NewOrder {
            number: "S-1".into(),
            kind: OrderKind::Sale,
            partner_id: Some("partner_1".into()),
            order_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            created_by: None,
        };
        let task = tokio::spawn(async move { client.create_order(new_order).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        let stored = <Order as Entity>::from_create_params("order_1".into(), payload).unwrap();
        responder.send(Ok("order_1".to_string())).unwrap();

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "order_1");
        responder.send(Ok(Some(stored.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(stored.header));
    }

    #[tokio::test]
    async fn test_find_by_number_returns_every_match() {
        use crate::domain::{NewOrder, OrderKind};
        use chrono::NaiveDate;

        let (client, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(client);

        let task = tokio::spawn(async move { client.find_by_number("S-2").await });

        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        let orders = [("order_3", "S-2"), ("order_1", "S-1"), ("order_2", "S-2")]
            .into_iter()
            .map(|(id, number)| {
                let new_order = NewOrder {
                    number: number.into(),
                    kind: OrderKind::Sale,
                    partner_id: None,
                    order_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                    created_by: None,
                };
                <Order as Entity>::from_create_params(id.into(), new_order).unwrap()
            })
            .collect();
        responder.send(Ok(orders)).unwrap();

        assert_eq!(
            task.await.unwrap(),
            Ok(vec!["order_2".to_string(), "order_3".to_string()])
        );
    }
}
