use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    NewOrderEvent,
    NewReviewEvent,
    OrderStatusEvent,
    ProductEvent,
    ShopEvent,
};

/// The bundle of producers that gets injected into the engine APIs. Cloning is cheap; each producer is a channel
/// sender. An API holding an empty bundle simply emits nothing.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub new_order_producer: Vec<EventProducer<NewOrderEvent>>,
    pub order_status_producer: Vec<EventProducer<OrderStatusEvent>>,
    pub shop_event_producer: Vec<EventProducer<ShopEvent>>,
    pub product_event_producer: Vec<EventProducer<ProductEvent>>,
    pub new_review_producer: Vec<EventProducer<NewReviewEvent>>,
}

pub struct EventHandlers {
    pub on_new_order: Option<EventHandler<NewOrderEvent>>,
    pub on_order_status: Option<EventHandler<OrderStatusEvent>>,
    pub on_shop_event: Option<EventHandler<ShopEvent>>,
    pub on_product_event: Option<EventHandler<ProductEvent>>,
    pub on_new_review: Option<EventHandler<NewReviewEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_new_order = hooks.on_new_order.map(|f| EventHandler::new(buffer_size, f));
        let on_order_status = hooks.on_order_status.map(|f| EventHandler::new(buffer_size, f));
        let on_shop_event = hooks.on_shop_event.map(|f| EventHandler::new(buffer_size, f));
        let on_product_event = hooks.on_product_event.map(|f| EventHandler::new(buffer_size, f));
        let on_new_review = hooks.on_new_review.map(|f| EventHandler::new(buffer_size, f));
        Self { on_new_order, on_order_status, on_shop_event, on_product_event, on_new_review }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_new_order {
            result.new_order_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_status {
            result.order_status_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_shop_event {
            result.shop_event_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_product_event {
            result.product_event_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_new_review {
            result.new_review_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_new_order {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_order_status {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_shop_event {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_product_event {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_new_review {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_new_order: Option<Handler<NewOrderEvent>>,
    pub on_order_status: Option<Handler<OrderStatusEvent>>,
    pub on_shop_event: Option<Handler<ShopEvent>>,
    pub on_product_event: Option<Handler<ProductEvent>>,
    pub on_new_review: Option<Handler<NewReviewEvent>>,
}

impl EventHooks {
    pub fn on_new_order<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NewOrderEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_new_order = Some(Arc::new(f));
        self
    }

    pub fn on_order_status<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_status = Some(Arc::new(f));
        self
    }

    pub fn on_shop_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ShopEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_shop_event = Some(Arc::new(f));
        self
    }

    pub fn on_product_event<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ProductEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_product_event = Some(Arc::new(f));
        self
    }

    pub fn on_new_review<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NewReviewEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_new_review = Some(Arc::new(f));
        self
    }
}
