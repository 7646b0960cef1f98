//! Requests against an item and the ordered queue they form.

use serde::{Deserialize, Serialize};

use circ_core::{ItemId, RequestId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    Hold,
    Recall,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "Open - Not yet filled")]
    OpenNotYetFilled,
    #[serde(rename = "Open - Awaiting pickup")]
    OpenAwaitingPickup,
    #[serde(rename = "Open - In transit")]
    OpenInTransit,
    #[serde(rename = "Open - Awaiting delivery")]
    OpenAwaitingDelivery,
    #[serde(rename = "Closed - Filled")]
    ClosedFilled,
    #[serde(rename = "Closed - Cancelled")]
    ClosedCancelled,
    #[serde(rename = "Closed - Unfilled")]
    ClosedUnfilled,
    #[serde(rename = "Closed - Pickup expired")]
    ClosedPickupExpired,
}

impl RequestStatus {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::OpenNotYetFilled | Self::OpenAwaitingPickup | Self::OpenInTransit | Self::OpenAwaitingDelivery
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub item_id: ItemId,
    pub request_type: RequestType,
    pub status: RequestStatus,
    /// 1-based queue position.
    pub position: u32,
}

impl Request {
    pub fn new(item_id: ItemId, request_type: RequestType, position: u32) -> Self {
        Self {
            id: RequestId::new(),
            item_id,
            request_type,
            status: RequestStatus::OpenNotYetFilled,
            position,
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_recall(&self) -> bool {
        self.request_type == RequestType::Recall
    }

    /// Hold or page; anything that is not a recall.
    pub fn is_hold(&self) -> bool {
        !self.is_recall()
    }
}

/// Requests for one item, ordered by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestQueue {
    requests: Vec<Request>,
}

impl RequestQueue {
    pub fn new(mut requests: Vec<Request>) -> Self {
        requests.sort_by_key(|r| r.position);
        Self { requests }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First active request; the only one renewal validation consults.
    pub fn head(&self) -> Option<&Request> {
        self.requests.iter().find(|r| r.is_active())
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_skips_closed_requests() {
        let item = ItemId::new();
        let queue = RequestQueue::new(vec![
            Request::new(item, RequestType::Recall, 2),
            Request::new(item, RequestType::Hold, 1).with_status(RequestStatus::ClosedFilled),
        ]);
        let head = queue.head().unwrap();
        assert_eq!(head.position, 2);
        assert!(head.is_recall());
    }

    #[test]
    fn test_empty_queue_has_no_head() {
        assert!(RequestQueue::empty().head().is_none());
        let item = ItemId::new();
        let closed = RequestQueue::new(vec![
            Request::new(item, RequestType::Hold, 1).with_status(RequestStatus::ClosedCancelled)
        ]);
        assert!(closed.head().is_none());
    }

    #[test]
    fn test_page_counts_as_hold() {
        let r = Request::new(ItemId::new(), RequestType::Page, 1);
        assert!(r.is_hold());
        assert!(!r.is_recall());
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&RequestStatus::OpenAwaitingPickup).unwrap();
        assert_eq!(json, "\"Open - Awaiting pickup\"");
    }
}
