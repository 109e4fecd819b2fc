use super::{Broker, BrokerItem, MemoryBroker, RedisBroker, Subscription};

fn published(data: &str) -> BrokerItem {
    BrokerItem::Published {
        channel: "chan".to_string(),
        data: data.to_string(),
    }
}

#[tokio::test]
async fn subscribe_acknowledges_then_relays() {
    let broker = MemoryBroker::new();
    let mut sub = broker.subscribe("chan").await.unwrap();
    assert_eq!(sub.name(), "chan");

    broker.publish("chan", "hello").await.unwrap();
    broker.publish("other", "ignored").await.unwrap();

    assert_eq!(
        sub.recv().await,
        BrokerItem::Subscription {
            channel: "chan".to_string(),
            kind: "subscribe".to_string(),
            count: 1,
        }
    );
    assert_eq!(sub.recv().await, published("hello"));
    assert_eq!(broker.published_count(), 2);
}

#[tokio::test]
async fn every_subscription_gets_every_message() {
    let broker = MemoryBroker::new();
    let mut a = broker.subscribe("chan").await.unwrap();
    let mut b = broker.subscribe("chan").await.unwrap();
    assert_eq!(broker.subscriber_count("chan"), 2);

    broker.publish("chan", "x").await.unwrap();
    for sub in [&mut a, &mut b] {
        let _ack = sub.recv().await;
        assert_eq!(sub.recv().await, published("x"));
    }
}

#[tokio::test]
async fn dropped_subscriptions_are_pruned() {
    let broker = MemoryBroker::new();
    let sub = broker.subscribe("chan").await.unwrap();
    drop(sub);

    assert_eq!(broker.subscriber_count("chan"), 0);
    broker.publish("chan", "x").await.unwrap();
}

#[tokio::test]
async fn injected_failures() {
    let broker = MemoryBroker::new();

    broker.fail_publishes(true);
    assert!(broker.publish("chan", "x").await.is_err());
    broker.fail_publishes(false);
    assert!(broker.publish("chan", "x").await.is_ok());

    broker.fail_next_subscribes(1);
    assert!(broker.subscribe("chan").await.is_err());
    let mut sub = broker.subscribe("chan").await.unwrap();

    assert_eq!(broker.fail_subscriptions("gone"), 1);
    let _ack = sub.recv().await;
    assert_eq!(sub.recv().await, BrokerItem::TerminalError("gone".to_string()));
}

#[tokio::test]
async fn closed_subscription_reads_as_terminal_error() {
    let (tx, mut sub) = Subscription::channel("chan");
    drop(tx);
    assert!(matches!(sub.recv().await, BrokerItem::TerminalError(_)));
}

#[test]
fn redis_broker_rejects_bad_urls() {
    assert!(RedisBroker::open("redis://127.0.0.1:6379").is_ok());
    assert!(RedisBroker::open("not a url").is_err());
}
