//! Request pipeline: validate, consult the cache, fetch, extract, persist

use std::fmt::Display;

use lunchbox_domain::{
    iso_date, parse_input_date, Clock, ExtractionMode, ExtractionOutcome, MenuCache, MenuExtractor,
    MenuPayload, MenuResponse, PageFetcher, SystemClock,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::MenuError;

/// A menu request as sent by the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuRequest {
    /// Page to extract the menu from
    pub url: Option<String>,
    /// Requested day in any accepted spelling; today when absent
    pub date: Option<String>,
}

impl MenuRequest {
    /// Create a request
    pub fn new(url: impl Into<String>, date: Option<&str>) -> Self {
        Self {
            url: Some(url.into()),
            date: date.map(str::to_string),
        }
    }

    /// Read a request from an arbitrary JSON body
    ///
    /// Anything that is not an object reads as an empty request. A url that
    /// is not a string counts as missing; a date that is not a string is
    /// kept in its JSON spelling so it fails date parsing.
    pub fn from_json(body: &Value) -> Self {
        let url = body.get("url").and_then(Value::as_str).map(str::to_string);
        let date = match body.get("date") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { url, date }
    }
}

/// Drives one menu request through cache, fetcher and extractor
pub struct MenuOrchestrator<C, F, X, K = SystemClock> {
    cache: C,
    fetcher: F,
    extractor: X,
    clock: K,
}

impl<C, F, X, K> MenuOrchestrator<C, F, X, K>
where
    C: MenuCache,
    C::Error: Display,
    F: PageFetcher,
    F::Error: Display,
    X: MenuExtractor,
    X::Error: Display,
    K: Clock,
{
    /// Create a new orchestrator
    pub fn new(cache: C, fetcher: F, extractor: X, clock: K) -> Self {
        Self {
            cache,
            fetcher,
            extractor,
            clock,
        }
    }

    /// Handle one request
    pub fn handle(&self, request: &MenuRequest) -> Result<MenuPayload, MenuError> {
        let url = match request.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return Err(MenuError::MissingUrl),
        };

        let today = self.clock.today();
        let target_date =
            parse_input_date(request.date.as_deref(), today).map_err(MenuError::InvalidDate)?;
        if target_date < today {
            return Err(MenuError::PastDate);
        }

        let target_iso = iso_date(target_date);
        info!("Menu request for {} on {}", url, target_iso);

        match self.cache.prune(&iso_date(today)) {
            Ok(0) => {}
            Ok(removed) => debug!("Pruned {} expired cache entries", removed),
            Err(e) => warn!("Cache prune failed: {}", e),
        }

        match self.cache.get(url, &target_iso) {
            Ok(Some(menu)) => {
                info!("Cache hit for {} on {}", url, target_iso);
                return Ok(MenuPayload::from_cache(menu));
            }
            Ok(None) => debug!("Cache miss for {} on {}", url, target_iso),
            Err(e) => warn!("Cache lookup failed, treating as miss: {}", e),
        }

        let page_text = self
            .fetcher
            .fetch(url)
            .map_err(|e| MenuError::Download(e.to_string()))?;
        debug!("Fetched {} chars of text from {}", page_text.chars().count(), url);

        let strict = self
            .extractor
            .extract(url, &page_text, target_date, ExtractionMode::Strict)
            .map_err(|e| MenuError::Llm(e.to_string()))?;

        let outcome = if strict.is_empty_menu() {
            info!("Strict extraction found no dishes, trying loose mode");
            self.loose_fallback(url, &page_text, target_date).unwrap_or(strict)
        } else {
            strict
        };

        let menu = match outcome {
            ExtractionOutcome::Menu(menu) => menu,
            ExtractionOutcome::Rejected(failure) => return Err(MenuError::Extraction(failure)),
        };

        if !menu.is_empty() {
            self.persist(url, &target_iso, &menu);
        }

        Ok(MenuPayload::fresh(menu))
    }

    /// A non-empty loose-mode result, if one can be had
    fn loose_fallback(
        &self,
        url: &str,
        page_text: &str,
        target_date: chrono::NaiveDate,
    ) -> Option<ExtractionOutcome> {
        match self
            .extractor
            .extract(url, page_text, target_date, ExtractionMode::Loose)
        {
            Ok(outcome) if outcome.has_items() => Some(outcome),
            Ok(_) => {
                info!("Loose extraction found no usable menu either");
                None
            }
            Err(e) => {
                warn!("Loose extraction failed, keeping strict result: {}", e);
                None
            }
        }
    }

    fn persist(&self, url: &str, target_iso: &str, menu: &MenuResponse) {
        match self.cache.put(url, target_iso, menu) {
            Ok(()) => info!("Cached {} item(s) for {} on {}", menu.menu_items.len(), url, target_iso),
            Err(e) => warn!("Cache write failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lunchbox_domain::{ExtractionFailure, FixedClock, MenuItem};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 19).unwrap()
    }

    #[derive(Default)]
    struct MemoryCache {
        rows: RefCell<HashMap<(String, String), MenuResponse>>,
        prunes: RefCell<Vec<String>>,
        broken: bool,
    }

    impl MenuCache for MemoryCache {
        type Error = String;

        fn prune(&self, today_iso: &str) -> Result<usize, String> {
            self.prunes.borrow_mut().push(today_iso.to_string());
            if self.broken {
                return Err("disk I/O error".to_string());
            }
            let mut rows = self.rows.borrow_mut();
            let before = rows.len();
            rows.retain(|(_, date), _| date.as_str() >= today_iso);
            Ok(before - rows.len())
        }

        fn get(&self, url: &str, date_iso: &str) -> Result<Option<MenuResponse>, String> {
            if self.broken {
                return Err("disk I/O error".to_string());
            }
            Ok(self.rows.borrow().get(&(url.to_string(), date_iso.to_string())).cloned())
        }

        fn put(&self, url: &str, date_iso: &str, menu: &MenuResponse) -> Result<(), String> {
            if self.broken {
                return Err("disk I/O error".to_string());
            }
            self.rows
                .borrow_mut()
                .insert((url.to_string(), date_iso.to_string()), menu.clone());
            Ok(())
        }
    }

    struct StubFetcher {
        result: Result<String, String>,
        calls: RefCell<usize>,
    }

    impl StubFetcher {
        fn ok() -> Self {
            Self {
                result: Ok("Kulajda 55,-".to_string()),
                calls: RefCell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err("connection refused".to_string()),
                calls: RefCell::new(0),
            }
        }
    }

    impl PageFetcher for StubFetcher {
        type Error = String;

        fn fetch(&self, _url: &str) -> Result<String, String> {
            *self.calls.borrow_mut() += 1;
            self.result.clone()
        }
    }

    type Scripted = Result<ExtractionOutcome, String>;

    /// Answers strict and loose attempts from separate scripts
    struct ScriptedExtractor {
        strict: Scripted,
        loose: Scripted,
        calls: RefCell<Vec<ExtractionMode>>,
    }

    impl ScriptedExtractor {
        fn new(strict: Scripted, loose: Scripted) -> Self {
            Self {
                strict,
                loose,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn modes(&self) -> Vec<ExtractionMode> {
            self.calls.borrow().clone()
        }
    }

    impl MenuExtractor for ScriptedExtractor {
        type Error = String;

        fn extract(
            &self,
            url: &str,
            _page_text: &str,
            target_date: NaiveDate,
            mode: ExtractionMode,
        ) -> Result<ExtractionOutcome, String> {
            self.calls.borrow_mut().push(mode);
            let scripted = match mode {
                ExtractionMode::Strict => self.strict.clone(),
                ExtractionMode::Loose => self.loose.clone(),
            };
            scripted.map(|outcome| match outcome {
                ExtractionOutcome::Menu(mut menu) => {
                    menu.stamp(url, target_date);
                    ExtractionOutcome::Menu(menu)
                }
                rejected => rejected,
            })
        }
    }

    fn menu_with(names: &[&str]) -> ExtractionOutcome {
        let mut menu = MenuResponse::empty("", today());
        menu.menu_items = names.iter().map(|name| MenuItem::named(*name)).collect();
        ExtractionOutcome::Menu(menu)
    }

    fn orchestrator(
        cache: MemoryCache,
        fetcher: StubFetcher,
        extractor: ScriptedExtractor,
    ) -> MenuOrchestrator<MemoryCache, StubFetcher, ScriptedExtractor, FixedClock> {
        MenuOrchestrator::new(cache, fetcher, extractor, FixedClock(today()))
    }

    const URL: &str = "https://r.example/menu";

    #[test]
    fn test_second_request_is_served_from_cache() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["Kulajda"])), Ok(menu_with(&[]))),
        );
        let request = MenuRequest::new(URL, Some("2025-11-20"));

        let first = o.handle(&request).unwrap();
        let second = o.handle(&request).unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.menu, second.menu);
        assert_eq!(second.menu.date, "2025-11-20");
        assert_eq!(second.menu.day_of_week, "Thursday");
        assert_eq!(o.extractor.modes(), vec![ExtractionMode::Strict]);
        assert_eq!(*o.fetcher.calls.borrow(), 1);
    }

    #[test]
    fn test_missing_url_wins_over_bad_date() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&["x"]))),
        );

        for date in [None, Some("garbage"), Some("2000-01-01")] {
            let request = MenuRequest {
                url: None,
                date: date.map(str::to_string),
            };
            assert!(matches!(o.handle(&request), Err(MenuError::MissingUrl)));
        }

        let empty = MenuRequest::new("", None);
        assert!(matches!(o.handle(&empty), Err(MenuError::MissingUrl)));
        assert!(o.cache.prunes.borrow().is_empty());
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&["x"]))),
        );

        let result = o.handle(&MenuRequest::new(URL, Some("not-a-date")));
        assert!(matches!(result, Err(MenuError::InvalidDate(_))));
        assert_eq!(*o.fetcher.calls.borrow(), 0);
    }

    #[test]
    fn test_past_date_is_rejected_before_any_work() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&["x"]))),
        );

        let result = o.handle(&MenuRequest::new(URL, Some("18.11.2025")));
        assert!(matches!(result, Err(MenuError::PastDate)));
        assert_eq!(*o.fetcher.calls.borrow(), 0);
        assert!(o.extractor.modes().is_empty());
    }

    #[test]
    fn test_missing_date_means_today() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&[]))),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();
        assert_eq!(payload.menu.date, "2025-11-19");
        assert_eq!(payload.menu.day_of_week, "Wednesday");
    }

    #[test]
    fn test_prune_runs_with_today_on_every_valid_request() {
        let cache = MemoryCache::default();
        let stale = MenuResponse::empty(URL, NaiveDate::from_ymd_opt(2025, 11, 18).unwrap());
        cache
            .rows
            .borrow_mut()
            .insert((URL.to_string(), "2025-11-18".to_string()), stale);

        let o = orchestrator(
            cache,
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&[]))),
        );
        o.handle(&MenuRequest::new(URL, Some("2025-11-25"))).unwrap();

        assert_eq!(*o.cache.prunes.borrow(), vec!["2025-11-19".to_string()]);
        assert!(!o
            .cache
            .rows
            .borrow()
            .contains_key(&(URL.to_string(), "2025-11-18".to_string())));
    }

    #[test]
    fn test_loose_result_replaces_empty_strict_result_and_is_cached() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&[])), Ok(menu_with(&["Guláš", "Řízek"]))),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();

        assert!(!payload.cached);
        assert_eq!(payload.menu.menu_items.len(), 2);
        assert_eq!(
            o.extractor.modes(),
            vec![ExtractionMode::Strict, ExtractionMode::Loose]
        );
        let cached = o.cache.get(URL, "2025-11-19").unwrap().unwrap();
        assert_eq!(cached, payload.menu);
    }

    #[test]
    fn test_empty_in_both_modes_is_an_uncached_success() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&[])), Ok(menu_with(&[]))),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();

        assert!(!payload.cached);
        assert!(payload.menu.is_empty());
        assert_eq!(payload.menu.source_url, URL);
        assert!(o.cache.rows.borrow().is_empty());
    }

    #[test]
    fn test_failed_fallback_keeps_strict_result() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&[])), Err("rate limited".to_string())),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();
        assert!(payload.menu.is_empty());
    }

    #[test]
    fn test_rejected_fallback_keeps_strict_result() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(
                Ok(menu_with(&[])),
                Ok(ExtractionOutcome::Rejected(ExtractionFailure::invalid_json("nope"))),
            ),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();
        assert!(payload.menu.is_empty());
    }

    #[test]
    fn test_strict_items_skip_fallback() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["Kulajda"])), Ok(menu_with(&["other"]))),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();
        assert_eq!(payload.menu.menu_items[0].name, "Kulajda");
        assert_eq!(o.extractor.modes(), vec![ExtractionMode::Strict]);
    }

    #[test]
    fn test_rejected_strict_output_is_a_server_error() {
        let failure = ExtractionFailure::schema_mismatch(json!({"menu_items": 1}), Vec::new());
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(
                Ok(ExtractionOutcome::Rejected(failure.clone())),
                Ok(menu_with(&["x"])),
            ),
        );

        match o.handle(&MenuRequest::new(URL, None)) {
            Err(MenuError::Extraction(reported)) => assert_eq!(reported, failure),
            other => panic!("Expected Extraction error, got {other:?}"),
        }
        // No fallback for rejected output
        assert_eq!(o.extractor.modes(), vec![ExtractionMode::Strict]);
        assert!(o.cache.rows.borrow().is_empty());
    }

    #[test]
    fn test_llm_failure_is_a_server_error() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::ok(),
            ScriptedExtractor::new(Err("Rate limit exceeded".to_string()), Ok(menu_with(&["x"]))),
        );

        match o.handle(&MenuRequest::new(URL, None)) {
            Err(err @ MenuError::Llm(_)) => {
                assert_eq!(err.to_string(), "OpenAI API call failed: Rate limit exceeded");
            }
            other => panic!("Expected Llm error, got {other:?}"),
        }
    }

    #[test]
    fn test_download_failure_is_a_gateway_error() {
        let o = orchestrator(
            MemoryCache::default(),
            StubFetcher::failing(),
            ScriptedExtractor::new(Ok(menu_with(&["x"])), Ok(menu_with(&["x"]))),
        );

        match o.handle(&MenuRequest::new(URL, None)) {
            Err(MenuError::Download(cause)) => assert_eq!(cause, "connection refused"),
            other => panic!("Expected Download error, got {other:?}"),
        }
        assert!(o.extractor.modes().is_empty());
    }

    #[test]
    fn test_broken_cache_does_not_fail_requests() {
        let cache = MemoryCache {
            broken: true,
            ..MemoryCache::default()
        };
        let o = orchestrator(
            cache,
            StubFetcher::ok(),
            ScriptedExtractor::new(Ok(menu_with(&["Kulajda"])), Ok(menu_with(&[]))),
        );

        let payload = o.handle(&MenuRequest::new(URL, None)).unwrap();
        assert!(!payload.cached);
        assert_eq!(payload.menu.menu_items.len(), 1);
    }

    #[test]
    fn test_request_from_json() {
        let request = MenuRequest::from_json(&json!({"url": URL, "date": "20.11."}));
        assert_eq!(request, MenuRequest::new(URL, Some("20.11.")));

        let odd = MenuRequest::from_json(&json!({"url": 42, "date": 20251120}));
        assert_eq!(odd.url, None);
        assert_eq!(odd.date.as_deref(), Some("20251120"));

        assert_eq!(MenuRequest::from_json(&json!([1, 2])), MenuRequest::default());
        assert_eq!(MenuRequest::from_json(&Value::Null), MenuRequest::default());
    }
}
