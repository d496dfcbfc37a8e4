//! Broker consumer: owns the connection and channel, pulls deliveries,
//! publishes correlated responses, and honors cancellation.
//!
//! Lifecycle (mirrored by [`crate::shutdown::LifecycleState`]):
//! `Stopped -> Running -> Cancelling -> Stopped`. Connecting is
//! startup-fatal; everything after that point is absorbed so the consume
//! loop stays live until it is cancelled or the broker goes away.

use std::sync::Arc;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicCancelOptions, BasicConsumeOptions, BasicPublishOptions,
    QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tracing::{error, info, warn};

use roster_core::{RequestMessage, ResponseMessage};

use crate::config::RmqConfig;
use crate::rmq::Dispatcher;
use crate::shutdown::ShutdownController;

const CONTENT_TYPE_JSON: &str = "application/json";
const REPLY_SUCCESS: u16 = 200;

/// Consumes request envelopes from the input queue and publishes response
/// envelopes to the output exchange.
///
/// One delivery is processed at a time; the connection and channel are
/// owned exclusively by this instance.
pub struct Consumer {
    connection: Connection,
    channel: Channel,
    config: RmqConfig,
    dispatcher: Dispatcher,
    shutdown: Arc<ShutdownController>,
}

impl Consumer {
    /// Dials the broker and opens the channel.
    ///
    /// # Errors
    ///
    /// Connect and channel-open failures propagate: the process cannot do
    /// anything useful without a transport, so the binary aborts at
    /// startup instead of retrying.
    pub async fn connect(
        config: RmqConfig,
        dispatcher: Dispatcher,
        shutdown: Arc<ShutdownController>,
    ) -> anyhow::Result<Self> {
        let connection =
            Connection::connect(&config.uri(), ConnectionProperties::default()).await?;
        info!(host = %config.host, port = config.port, "connected to broker");

        let channel = connection.create_channel().await?;

        Ok(Self {
            connection,
            channel,
            config,
            dispatcher,
            shutdown,
        })
    }

    /// Runs the consume loop until cancellation or until the broker closes
    /// the delivery stream.
    ///
    /// Each iteration selects between the next delivery and the shutdown
    /// signal, re-arming after every processed delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be declared or the consumer
    /// cannot be registered; both are startup-order failures.
    pub async fn run(self) -> anyhow::Result<()> {
        self.channel
            .queue_declare(
                &self.config.in_queue,
                QueueDeclareOptions::default(),
                FieldTable::default(),
            )
            .await?;

        // Manual acknowledgement: a message leaves the queue only after
        // processing and an explicit ack.
        let mut deliveries = self
            .channel
            .basic_consume(
                &self.config.in_queue,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let mut shutdown = self.shutdown.subscribe();
        self.shutdown.set_running();
        info!(
            queue = %self.config.in_queue,
            tag = %self.config.consumer_tag,
            "consuming"
        );

        loop {
            tokio::select! {
                delivery = deliveries.next() => match delivery {
                    Some(Ok(delivery)) => self.process(delivery).await,
                    Some(Err(err)) => error!(%err, "delivery stream error"),
                    None => {
                        warn!("delivery stream closed by broker");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("cancellation signalled, stopping consumer");
                    break;
                }
            }
        }

        self.teardown().await;
        Ok(())
    }

    /// Processes one delivery end to end.
    ///
    /// An undecodable body is logged and dropped: no ack, no response.
    /// Every decodable request is answered and acked; publish failures are
    /// logged but never block the ack, preserving inbound at-least-once at
    /// the cost of an undetectable lost response.
    async fn process(&self, delivery: Delivery) {
        let request: RequestMessage = match serde_json::from_slice(&delivery.data) {
            Ok(request) => request,
            Err(err) => {
                error!(%err, "dropping undecodable delivery");
                return;
            }
        };

        let kind = request.kind;
        let outcome = self.dispatcher.dispatch(request).await;
        let response = ResponseMessage::from_result(&outcome);

        if let Err(err) = self.publish(&response).await {
            error!(%err, operation = kind.as_str(), "publishing response failed");
        }
        if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
            error!(%err, operation = kind.as_str(), "acknowledging delivery failed");
        }
    }

    async fn publish(&self, response: &ResponseMessage) -> lapin::Result<()> {
        // Fire and forget: publisher confirms are not enabled, so the
        // returned confirmation resolves immediately and is dropped.
        let _confirm = self
            .channel
            .basic_publish(
                &self.config.out_exchange,
                &self.config.out_routing_key,
                BasicPublishOptions::default(),
                &response.to_bytes(),
                BasicProperties::default().with_content_type(CONTENT_TYPE_JSON.into()),
            )
            .await?;
        Ok(())
    }

    /// Orderly teardown: cancel the broker-side consumer registration,
    /// then close channel and connection. Errors here are logged, not
    /// propagated -- the consumer is stopping either way.
    async fn teardown(&self) {
        self.shutdown.begin_cancel();

        if let Err(err) = self
            .channel
            .basic_cancel(&self.config.consumer_tag, BasicCancelOptions::default())
            .await
        {
            error!(%err, "cancelling broker consumer failed");
        }
        if let Err(err) = self.channel.close(REPLY_SUCCESS, "shutting down").await {
            error!(%err, "closing channel failed");
        }
        if let Err(err) = self.connection.close(REPLY_SUCCESS, "shutting down").await {
            error!(%err, "closing connection failed");
        }

        self.shutdown.set_stopped();
        info!("consumer stopped");
    }
}
