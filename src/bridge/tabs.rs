use super::{BridgeEvent, PageId};
use crate::extractor::{is_host_page, is_post_page};
use std::collections::HashMap;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabActivationState {
    #[default]
    Inactive,
    TwitterNonPost,
    PostPage,
}

impl TabActivationState {
    pub fn classify(url: &str) -> Self {
        if is_post_page(url) {
            TabActivationState::PostPage
        } else if is_host_page(url) {
            TabActivationState::TwitterNonPost
        } else {
            TabActivationState::Inactive
        }
    }
}

/// The user-facing way into the feature for a page (toolbar icon, popup).
pub trait EntryPoint: Send {
    fn enable(&mut self, page: PageId);
    fn disable(&mut self, page: PageId);
}

pub struct TabTracker<E> {
    states: HashMap<PageId, TabActivationState>,
    entry_point: E,
}

impl<E: EntryPoint> TabTracker<E> {
    pub fn new(entry_point: E) -> Self {
        Self {
            states: HashMap::new(),
            entry_point,
        }
    }

    pub fn state(&self, page: PageId) -> TabActivationState {
        self.states.get(&page).copied().unwrap_or_default()
    }

    pub fn tracked_pages(&self) -> usize {
        self.states.len()
    }

    pub fn entry_point(&self) -> &E {
        &self.entry_point
    }

    pub fn handle(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::NavigationComplete { page, url } => {
                self.transition(*page, TabActivationState::classify(url));
            }
            // A ready signal only ever promotes a page
            BridgeEvent::ContextReady { page, url } => {
                if is_post_page(url) {
                    self.transition(*page, TabActivationState::PostPage);
                }
            }
            BridgeEvent::PageClosed { page } => {
                self.states.remove(page);
                tracing::debug!(%page, "page closed");
            }
        }
    }

    fn transition(&mut self, page: PageId, next: TabActivationState) {
        let previous = self.states.insert(page, next).unwrap_or_default();
        if previous != next {
            tracing::info!(%page, ?previous, ?next, "page activation changed");
        }

        if next == TabActivationState::PostPage {
            self.entry_point.enable(page);
        } else {
            self.entry_point.disable(page);
        }
    }

    /// Apply events until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<BridgeEvent>) -> Self {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingEntryPoint {
        calls: Vec<(PageId, bool)>,
    }

    impl EntryPoint for RecordingEntryPoint {
        fn enable(&mut self, page: PageId) {
            self.calls.push((page, true));
        }

        fn disable(&mut self, page: PageId) {
            self.calls.push((page, false));
        }
    }

    fn navigate(page: u64, url: &str) -> BridgeEvent {
        BridgeEvent::NavigationComplete {
            page: PageId(page),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            TabActivationState::classify("https://x.com/a/status/1"),
            TabActivationState::PostPage
        );
        assert_eq!(
            TabActivationState::classify("https://twitter.com/home"),
            TabActivationState::TwitterNonPost
        );
        assert_eq!(
            TabActivationState::classify("https://example.com/"),
            TabActivationState::Inactive
        );
    }

    #[test]
    fn test_navigation_drives_entry_point() {
        let mut tracker = TabTracker::new(RecordingEntryPoint::default());
        tracker.handle(&navigate(1, "https://x.com/a/status/10"));
        tracker.handle(&navigate(1, "https://x.com/home"));
        tracker.handle(&navigate(2, "https://example.com/"));

        assert_eq!(tracker.state(PageId(1)), TabActivationState::TwitterNonPost);
        assert_eq!(tracker.state(PageId(2)), TabActivationState::Inactive);
        assert_eq!(
            tracker.entry_point().calls,
            vec![(PageId(1), true), (PageId(1), false), (PageId(2), false)]
        );
    }

    #[test]
    fn test_context_ready_only_promotes() {
        let mut tracker = TabTracker::new(RecordingEntryPoint::default());
        tracker.handle(&navigate(1, "https://x.com/home"));
        tracker.handle(&BridgeEvent::ContextReady {
            page: PageId(1),
            url: "https://x.com/explore".to_string(),
        });
        assert_eq!(tracker.state(PageId(1)), TabActivationState::TwitterNonPost);

        tracker.handle(&BridgeEvent::ContextReady {
            page: PageId(1),
            url: "https://x.com/a/status/5".to_string(),
        });
        assert_eq!(tracker.state(PageId(1)), TabActivationState::PostPage);
        assert_eq!(tracker.entry_point().calls.last(), Some(&(PageId(1), true)));
    }

    #[test]
    fn test_close_forgets_page() {
        let mut tracker = TabTracker::new(RecordingEntryPoint::default());
        tracker.handle(&navigate(4, "https://x.com/a/status/5"));
        assert_eq!(tracker.tracked_pages(), 1);

        tracker.handle(&BridgeEvent::PageClosed { page: PageId(4) });
        assert_eq!(tracker.tracked_pages(), 0);
        assert_eq!(tracker.state(PageId(4)), TabActivationState::Inactive);
    }

    #[tokio::test]
    async fn test_run_consumes_until_senders_drop() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(navigate(1, "https://twitter.com/a/status/9")).unwrap();
        tx.send(navigate(2, "https://twitter.com/a/status/9")).unwrap();
        tx.send(BridgeEvent::PageClosed { page: PageId(2) }).unwrap();
        drop(tx);

        let tracker = TabTracker::new(RecordingEntryPoint::default()).run(rx).await;
        assert_eq!(tracker.state(PageId(1)), TabActivationState::PostPage);
        assert_eq!(tracker.tracked_pages(), 1);
    }
}
