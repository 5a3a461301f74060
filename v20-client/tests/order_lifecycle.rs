//! Order, trade and account flows driven through a scripted transport.

mod common;

use rust_decimal_macros::dec;
use serde_json::json;

use common::{client, path, ScriptedTransport};
use v20_client::orders::{ClientExtensions, OrderQuery, OrderSide, OrderSpec, OrderUpdate};
use v20_client::trades::TradeUpdate;
use v20_client::{
    AccountService, BrokerError, HttpMethod, Identifier, OrderService, ProviderId, TradeService,
    WriteOutcome,
};

fn pending_stop(id: &str) -> serde_json::Value {
    json!({
        "order": {
            "id": id,
            "createTime": "2024-03-01T10:00:00.000000000Z",
            "state": "PENDING",
            "type": "STOP",
            "instrument": "EUR_USD",
            "units": "-100",
            "price": "1.09000",
            "priceBound": "1.08900",
            "timeInForce": "GTC",
            "triggerCondition": "DEFAULT",
            "partialFill": "DEFAULT_FILL",
            "positionFill": "POSITION_DEFAULT",
            "clientExtensions": {"id": "breakdown", "tag": "swing"},
            "stopLossOnFill": {"price": "1.10000", "timeInForce": "GTC"}
        }
    })
}

fn open_trade() -> serde_json::Value {
    json!({
        "trade": {
            "id": "77",
            "instrument": "GBP_USD",
            "state": "OPEN",
            "price": "1.27000",
            "initialUnits": "500",
            "currentUnits": "500",
            "stopLossOrder": {"id": "78", "type": "STOP_LOSS", "tradeID": "77", "price": "1.26000",
                              "timeInForce": "GTC", "state": "PENDING"}
        }
    })
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_create_market_order_returns_provider_id() {
    let transport = ScriptedTransport::new();
    transport.respond(201, json!({"orderCreateTransaction": {"id": "1001", "type": "MARKET_ORDER"}}));
    let client = client(&transport);

    let spec = OrderSpec::market("EUR_USD", OrderSide::Sell, dec!(100)).with_stop_loss(dec!(1.12));
    let outcome = client.create_order(&spec).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Created(ProviderId(1001)));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].endpoint, path("/orders"));
    assert_eq!(
        requests[0].body,
        Some(json!({
            "order": {
                "type": "MARKET",
                "instrument": "EUR_USD",
                "units": "-100",
                "timeInForce": "FOK",
                "positionFill": "DEFAULT",
                "stopLossOnFill": {"price": "1.12", "timeInForce": "GTC"}
            }
        }))
    );
}

#[tokio::test]
async fn test_create_with_alias_then_read_by_alias() {
    let transport = ScriptedTransport::new();
    transport
        .respond(201, json!({"orderCreateTransaction": {"id": "1002"}}))
        .respond(
            200,
            json!({"order": {"id": "1002", "type": "LIMIT", "state": "PENDING", "instrument": "USD_JPY",
                             "units": "1000", "price": "148.500", "timeInForce": "GTC",
                             "clientExtensions": {"id": "X"}}}),
        );
    let client = client(&transport);

    let spec = OrderSpec::limit("USD_JPY", OrderSide::Buy, dec!(1000), dec!(148.5)).with_alias("X");
    let outcome = client.create_order(&spec).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Acknowledged(true));

    let order = client.get_order(&Identifier::alias("X").unwrap()).await.unwrap();
    assert_eq!(order.alias(), Some("X"));
    assert_eq!(transport.endpoints()[1], path("/orders/@X"));
}

#[tokio::test]
async fn test_local_validation_sends_nothing() {
    let transport = ScriptedTransport::new();
    let client = client(&transport);

    let missing_price = OrderSpec::new(
        v20_client::orders::OrderType::Limit,
        "EUR_USD",
        OrderSide::Buy,
        dec!(10),
    );
    let err = client.create_order(&missing_price).await.unwrap_err();
    assert!(matches!(err, BrokerError::MissingRequiredField { field: "price", .. }));

    let bad_instrument = OrderSpec::market("DOGE_USD", OrderSide::Buy, dec!(10));
    assert!(matches!(
        client.create_order(&bad_instrument).await,
        Err(BrokerError::Validation(_))
    ));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_remote_rejection_is_surfaced() {
    let transport = ScriptedTransport::new();
    transport.respond(
        400,
        json!({"errorCode": "INSUFFICIENT_MARGIN", "errorMessage": "Insufficient margin"}),
    );
    let client = client(&transport);

    let err = client
        .create_order(&OrderSpec::market("EUR_USD", OrderSide::Buy, dec!(1_000_000)))
        .await
        .unwrap_err();
    assert_eq!(err, BrokerError::remote(400, "Insufficient margin"));
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_update_by_provider_id_adds_take_profit() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, pending_stop("42"))
        .respond(201, json!({"orderCreateTransaction": {"id": "43"}, "orderCancelTransaction": {"id": "44"}}));
    let client = client(&transport);

    let outcome = client
        .update_order(
            &Identifier::ByProviderId(ProviderId(42)),
            &OrderUpdate::new().take_profit(dec!(1.25)),
        )
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Created(ProviderId(43)));

    let requests = transport.requests();
    assert_eq!(requests[0].method, HttpMethod::Get);
    assert_eq!(requests[0].endpoint, path("/orders/42"));
    assert_eq!(requests[1].method, HttpMethod::Put);
    assert_eq!(requests[1].endpoint, path("/orders/42"));
    assert_eq!(
        requests[1].body,
        Some(json!({
            "order": {
                "type": "STOP",
                "instrument": "EUR_USD",
                "units": "-100",
                "price": "1.09000",
                "priceBound": "1.08900",
                "timeInForce": "GTC",
                "positionFill": "DEFAULT",
                "clientExtensions": {"id": "breakdown", "tag": "swing"},
                "stopLossOnFill": {"price": "1.10000", "timeInForce": "GTC"},
                "takeProfitOnFill": {"price": "1.25", "timeInForce": "GTC"}
            }
        }))
    );
}

#[tokio::test]
async fn test_update_by_alias_acknowledges() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, pending_stop("42"))
        .respond(201, json!({"orderCreateTransaction": {"id": "43"}}));
    let client = client(&transport);

    let id = Identifier::resolve(None, Some("breakdown")).unwrap();
    let outcome = client
        .update_order(&id, &OrderUpdate::new().price(dec!(1.0850)).units(dec!(150)))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Acknowledged(true));

    let put = &transport.requests()[1];
    assert_eq!(put.endpoint, path("/orders/@breakdown"));
    let order = &put.body.as_ref().unwrap()["order"];
    assert_eq!(order["price"], json!("1.0850"));
    assert_eq!(order["units"], json!("-150"));
}

#[tokio::test]
async fn test_update_aborts_when_read_fails() {
    let transport = ScriptedTransport::new();
    transport.respond(404, json!({"errorMessage": "The Order specified does not exist"}));
    let client = client(&transport);

    let err = client
        .update_order(&ProviderId(9).into(), &OrderUpdate::new().price(dec!(1.1)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_update_refuses_filled_order() {
    let transport = ScriptedTransport::new();
    let mut filled = pending_stop("42");
    filled["order"]["state"] = json!("FILLED");
    transport.respond(200, filled);
    let client = client(&transport);

    let err = client
        .update_order(&ProviderId(42).into(), &OrderUpdate::new().price(dec!(1.1)))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Validation(_)));
    assert_eq!(transport.endpoints(), vec![path("/orders/42")]);
}

#[tokio::test]
async fn test_create_without_transaction_is_parse_error() {
    let transport = ScriptedTransport::new();
    transport.respond(201, json!({"lastTransactionID": "17"}));
    let client = client(&transport);

    let err = client
        .create_order(&OrderSpec::market("EUR_USD", OrderSide::Buy, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Parse(_)));
}

#[tokio::test]
async fn test_update_validates_before_reading() {
    let transport = ScriptedTransport::new();
    let client = client(&transport);

    let err = client
        .update_order(&ProviderId(9).into(), &OrderUpdate::new().units(dec!(0)))
        .await
        .unwrap_err();
    assert!(err.is_local());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_cancel_and_extensions() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, json!({"orderCancelTransaction": {"id": "50"}}))
        .respond(200, json!({"orderClientExtensionsModifyTransaction": {"id": "51"}}));
    let client = client(&transport);

    assert!(client.cancel_order(&ProviderId(42).into()).await.unwrap());

    let ext = ClientExtensions {
        tag: Some("reviewed".into()),
        comment: Some("moved to weekly".into()),
        ..Default::default()
    };
    assert!(client
        .update_order_extensions(&Identifier::alias("breakdown").unwrap(), &ext)
        .await
        .unwrap());

    let requests = transport.requests();
    assert_eq!(requests[0].endpoint, path("/orders/42/cancel"));
    assert_eq!(requests[0].body, None);
    assert_eq!(requests[1].endpoint, path("/orders/@breakdown/clientExtensions"));
    assert_eq!(
        requests[1].body,
        Some(json!({"clientExtensions": {"tag": "reviewed", "comment": "moved to weekly"}}))
    );

    let err = client
        .update_order_extensions(&ProviderId(1).into(), &ClientExtensions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Validation(_)));
}

#[tokio::test]
async fn test_list_orders_query() {
    let transport = ScriptedTransport::new();
    transport.respond(200, json!({"orders": [], "lastTransactionID": "99"}));
    let client = client(&transport);

    let query = OrderQuery {
        instrument: Some("EUR_USD".into()),
        state: Some("ALL".into()),
        ..Default::default()
    };
    assert!(client.list_orders(&query).await.unwrap().is_empty());

    let request = &transport.requests()[0];
    assert_eq!(request.endpoint, path("/orders"));
    assert_eq!(
        request.query,
        vec![
            ("state".to_string(), "ALL".to_string()),
            ("instrument".to_string(), "EUR_USD".to_string())
        ]
    );
}

// ============================================================================
// Trades
// ============================================================================

#[tokio::test]
async fn test_update_trade_moves_take_profit_only() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, open_trade())
        .respond(200, json!({"takeProfitOrderTransaction": {"id": "80"}}));
    let client = client(&transport);

    let outcome = client
        .update_trade(&ProviderId(77).into(), &TradeUpdate::new().take_profit(dec!(1.29)))
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Created(ProviderId(77)));

    let put = &transport.requests()[1];
    assert_eq!(put.method, HttpMethod::Put);
    assert_eq!(put.endpoint, path("/trades/77/orders"));
    assert_eq!(
        put.body,
        Some(json!({
            "takeProfit": {"price": "1.29", "timeInForce": "GTC"},
            "stopLoss": {"price": "1.26000", "timeInForce": "GTC"}
        }))
    );
}

#[tokio::test]
async fn test_update_trade_clears_stop_loss_by_alias() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, open_trade())
        .respond(200, json!({"stopLossOrderCancelTransaction": {"id": "81"}}));
    let client = client(&transport);

    let outcome = client
        .update_trade(&Identifier::alias("gbp-long").unwrap(), &TradeUpdate::new().clear_stop_loss())
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Acknowledged(true));
    assert_eq!(transport.requests()[1].body, Some(json!({"stopLoss": null})));
}

#[tokio::test]
async fn test_close_trade_full_and_partial() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, json!({"orderFillTransaction": {"id": "90"}}))
        .respond(200, json!({"orderFillTransaction": {"id": "91"}}));
    let client = client(&transport);

    assert!(client.close_trade(&ProviderId(77).into(), Some(dec!(200))).await.unwrap());
    assert!(client.close_trade(&ProviderId(77).into(), None).await.unwrap());

    let requests = transport.requests();
    assert_eq!(requests[0].endpoint, path("/trades/77/close"));
    assert_eq!(requests[0].body, Some(json!({"units": "200"})));
    assert_eq!(requests[1].body, None);

    let err = client
        .close_trade(&ProviderId(77).into(), Some(dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, BrokerError::Validation(_)));
    assert_eq!(transport.requests().len(), 2);
}

// ============================================================================
// Account
// ============================================================================

#[tokio::test]
async fn test_pricing_validates_codes_locally() {
    let transport = ScriptedTransport::new();
    transport.respond(200, json!({"prices": []}));
    let client = client(&transport);

    assert!(matches!(
        client.pricing(&["EUR_USD", "NOPE"]).await,
        Err(BrokerError::Validation(_))
    ));
    assert!(matches!(
        client.pricing(&[]).await,
        Err(BrokerError::MissingRequiredField { field: "instruments", .. })
    ));
    assert!(transport.requests().is_empty());

    client.pricing(&["EUR_USD", "XAU_USD"]).await.unwrap();
    let request = &transport.requests()[0];
    assert_eq!(request.endpoint, path("/pricing"));
    assert_eq!(
        request.query,
        vec![("instruments".to_string(), "EUR_USD,XAU_USD".to_string())]
    );
}

#[tokio::test]
async fn test_configure_account_margin_rate() {
    let transport = ScriptedTransport::new();
    transport.respond(200, json!({"clientConfigureTransaction": {"marginRate": "0.05"}}));
    let client = client(&transport);

    assert!(client.configure_account(dec!(1.5)).await.is_err());
    client.configure_account(dec!(0.05)).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Patch);
    assert_eq!(request.endpoint, path("/configuration"));
    assert_eq!(request.body, Some(json!({"marginRate": "0.05"})));
}

#[tokio::test]
async fn test_accounts_and_other_account() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, json!({"accounts": [{"id": "101-004-1234567-001"}]}))
        .respond(200, json!({"account": {"id": "101-004-1234567-002"}}))
        .respond(200, json!({"instruments": []}));
    let client = client(&transport);

    client.accounts().await.unwrap();
    let other = client.for_account("101-004-1234567-002");
    let summary = other.account_summary().await.unwrap();
    assert_eq!(summary["account"]["id"], json!("101-004-1234567-002"));
    client.instruments(&[]).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].endpoint, "");
    assert_eq!(requests[1].endpoint, "/101-004-1234567-002/summary");
    assert_eq!(requests[2].endpoint, path("/instruments"));
    assert!(requests[2].query.is_empty());
}
