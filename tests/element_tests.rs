use map_element::prelude::*;

/// Element scenarios driven through the headless engine and a manual clock
mod element_tests {
    use super::*;

    struct Harness {
        element: MapElement<Map, ManualClock>,
        map: MapHandle<Map>,
        clock: ManualClock,
        window: WindowEvents,
        /// Notifications from mounting and the first-paint resize
        initial: Vec<Notification<Map>>,
    }

    impl Harness {
        fn poll(&mut self) {
            self.element.poll().unwrap();
        }

        fn advance(&mut self, ms: u64) {
            self.clock.advance_ms(ms);
            self.poll();
        }

        fn stats(&self) -> MapStats {
            self.map.borrow().stats()
        }

        fn center_updates(&mut self) -> Vec<LatLng> {
            self.element
                .take_notifications()
                .into_iter()
                .filter_map(|n| match n.event {
                    ElementEvent::CenterUpdated(center) => Some(center),
                    _ => None,
                })
                .collect()
        }

        fn marker_positions(&self) -> Vec<LatLng> {
            let map = self.map.borrow();
            self.element
                .marker_layers()
                .iter()
                .filter_map(|id| map.layer_position(id))
                .collect()
        }
    }

    /// Mounts an element configured by `setup` and lets the first-paint resize settle
    fn mounted(setup: impl FnOnce(&mut MapElement<Map, ManualClock>)) -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();

        let clock = ManualClock::new();
        let window = WindowEvents::new();
        let mut element = MapElement::with_clock(window.clone(), clock.clone());
        setup(&mut element);

        element.connect();
        let map = element.mount(Map::default()).unwrap();

        let mut harness = Harness {
            element,
            map,
            clock,
            window,
            initial: Vec::new(),
        };
        harness.poll();
        harness.advance(200);
        harness.initial = harness.element.take_notifications();
        harness
    }

    fn stations() -> [MarkerInformation; 3] {
        [
            MarkerInformation::new(47.3779, 8.5403).with_title("Zurich HB"),
            MarkerInformation::new(47.3917, 8.5112).with_title("Hardbrucke"),
            MarkerInformation::new(47.3663, 8.5480)
                .with_title("Stadelhofen")
                .with_url("https://example.org/stadelhofen"),
        ]
    }

    fn assert_close(actual: LatLng, expected: LatLng) {
        assert!(
            (actual.lat - expected.lat).abs() < 1e-9 && (actual.lng - expected.lng).abs() < 1e-9,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    #[test]
    fn test_map_ready_once_after_mount() {
        let harness = mounted(|_| {});
        let ready: Vec<_> = harness
            .initial
            .iter()
            .filter(|n| n.name() == "map-ready")
            .collect();

        assert_eq!(ready.len(), 1);
        assert!(ready[0].bubbles && ready[0].composed);
        match &ready[0].event {
            ElementEvent::MapReady(handle) => assert!(handle.ptr_eq(&harness.map)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_single_center_marker_follows_coordinates() {
        let mut harness = mounted(|_| {});
        assert_eq!(harness.map.borrow().markers().len(), 1);

        let bern = LatLng::new(46.9480, 7.4474);
        harness.element.set_center(bern);
        harness.poll();

        let map = harness.map.borrow();
        assert_eq!(map.markers().len(), 1);
        assert_close(map.markers()[0].position(), bern);
        let center_marker = harness.element.center_marker().unwrap();
        assert_eq!(map.markers()[0].id(), center_marker);
        assert_close(map.viewport().center, bern);
    }

    #[test]
    fn test_radius_keeps_one_circle() {
        let mut harness = mounted(|_| {});
        assert!(harness.map.borrow().circles().is_empty());

        for radius in [300.0, 450.0, 900.0] {
            harness.element.set_radius(radius).unwrap();
            harness.poll();

            let map = harness.map.borrow();
            assert_eq!(map.circles().len(), 1);
            assert_eq!(map.circles()[0].radius(), radius);
        }

        harness.element.set_radius(0.0).unwrap();
        harness.poll();
        assert!(harness.map.borrow().circles().is_empty());
        assert!(harness.element.radius_layer().is_none());
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        let mut harness = mounted(|element| element.set_radius(100.0).unwrap());
        assert!(harness.element.set_radius(-10.0).is_err());
        harness.poll();
        assert_eq!(harness.map.borrow().circles()[0].radius(), 100.0);
    }

    #[test]
    fn test_marker_list_replacement() {
        let [a, b, c] = stations();
        let mut harness = mounted(|element| element.set_markers(vec![a.clone(), b.clone(), c.clone()]));
        assert_eq!(harness.element.marker_layers().len(), 3);

        harness.element.set_markers(vec![b.clone(), c.clone()]);
        harness.poll();

        let positions = harness.marker_positions();
        assert_eq!(positions.len(), 2);
        assert!(!positions.contains(&a.position()));
        assert!(positions.contains(&b.position()));
        // markers plus the center marker
        assert_eq!(harness.map.borrow().markers().len(), 3);
    }

    #[test]
    fn test_marker_popups() {
        let [a, _, c] = stations();
        let plain = MarkerInformation::new(47.40, 8.50);
        let harness = mounted(|element| element.set_markers(vec![a, c, plain]));

        let map = harness.map.borrow();
        let popups: Vec<Option<String>> = harness
            .element
            .marker_layers()
            .iter()
            .map(|id| {
                map.layers()
                    .get_as::<Marker>(id)
                    .and_then(|m| m.popup())
                    .map(|p| p.content().to_string())
            })
            .collect();

        assert_eq!(
            popups[0].as_deref(),
            Some(r#"<div part="popup" class="popup"><span part="popup-title" class="popup-title">Zurich HB</span></div>"#)
        );
        assert!(popups[1]
            .as_deref()
            .is_some_and(|html| html.contains(r#"href="https://example.org/stadelhofen""#)));
        assert!(popups[2].is_none());
    }

    #[test]
    fn test_fit_bounds_prefers_radius_over_markers() {
        let [a, b, c] = stations();
        let mut harness = mounted(|element| element.set_markers(vec![a, b, c]));
        let markers_zoom = harness.map.borrow().viewport().zoom;

        harness.element.set_radius(50.0).unwrap();
        harness.poll();
        let radius_zoom = harness.map.borrow().viewport().zoom;

        // a 50 m circle is far smaller than the marker spread
        assert!(radius_zoom > markers_zoom);
    }

    #[test]
    fn test_selected_marker_opens_popup_and_pans() {
        let [a, b, c] = stations();
        let mut harness = mounted(|element| element.set_markers(vec![a, b.clone(), c]));

        harness.element.set_selected_marker(Some(b.clone()));
        harness.poll();

        let map = harness.map.borrow();
        let selected = map.open_popup_layer().unwrap();
        assert_eq!(map.layer_position(&selected), Some(b.position()));
        assert_close(map.viewport().center, b.position());
    }

    #[test]
    fn test_unmatched_selection_is_ignored() {
        let [a, b, c] = stations();
        let mut harness = mounted(|element| element.set_markers(vec![a, b, c]));
        let before = harness.stats();

        harness
            .element
            .set_selected_marker(Some(MarkerInformation::new(47.0, 8.0)));
        harness.poll();

        assert_eq!(harness.stats().pans, before.pans);
        assert!(harness.map.borrow().open_popup_layer().is_none());
    }

    #[test]
    fn test_single_click_updates_center() {
        let mut harness = mounted(|element| element.set_update_center_on_click(true));
        let target = LatLng::new(47.3950, 8.5300);

        harness.map.borrow_mut().click_lat_lng(target);
        harness.poll();
        assert!(harness.element.is_click_pending());

        harness.advance(499);
        assert!(harness.center_updates().is_empty());

        harness.advance(1);
        assert_eq!(harness.center_updates(), vec![target]);
        assert_eq!(harness.element.state().center(), target);

        let map = harness.map.borrow();
        let center_marker = harness.element.center_marker().unwrap();
        assert_eq!(map.layer_position(center_marker), Some(target));
    }

    #[test]
    fn test_double_click_does_not_update_center() {
        let mut harness = mounted(|element| element.set_update_center_on_click(true));
        let start = harness.element.state().center();

        harness.map.borrow_mut().click_lat_lng(start);
        harness.poll();
        harness.advance(100);
        harness.map.borrow_mut().click_lat_lng(start);
        harness.poll();
        assert!(!harness.element.is_click_pending());

        harness.advance(1000);
        assert!(harness.center_updates().is_empty());

        harness.map.borrow_mut().double_click_at(Point::new(100.0, 100.0));
        harness.poll();
        harness.advance(1000);
        assert!(harness.center_updates().is_empty());
        assert_eq!(harness.element.state().center(), start);
    }

    #[test]
    fn test_click_ignored_without_update_center_on_click() {
        let mut harness = mounted(|_| {});
        let start = harness.element.state().center();

        harness.map.borrow_mut().click_at(Point::new(10.0, 10.0));
        harness.poll();
        harness.advance(600);

        assert!(harness.center_updates().is_empty());
        assert_eq!(harness.element.state().center(), start);
    }

    #[test]
    fn test_resize_burst_is_debounced() {
        let mut harness = mounted(|element| element.set_radius(300.0).unwrap());
        let before = harness.stats();

        for _ in 0..5 {
            harness.window.dispatch(WindowSignal::Resize);
            harness.advance(30);
        }
        assert!(harness.element.is_resize_pending());
        assert_eq!(harness.stats(), before);

        harness.advance(200);
        let after = harness.stats();
        assert_eq!(after.size_invalidations, before.size_invalidations + 1);
        assert_eq!(after.bounds_fits, before.bounds_fits + 1);
        assert!(!harness.element.is_resize_pending());
    }

    #[test]
    fn test_resize_applies_container_size() {
        let mut harness = mounted(|_| {});
        harness
            .map
            .borrow_mut()
            .set_container_size(Point::new(320.0, 240.0));

        harness.window.dispatch(WindowSignal::Resize);
        harness.poll();
        harness.advance(200);

        assert_eq!(harness.map.borrow().viewport().size, Point::new(320.0, 240.0));
    }

    #[test]
    fn test_reconnect_keeps_one_listener() {
        let mut harness = mounted(|element| element.set_radius(300.0).unwrap());
        assert_eq!(harness.window.listener_count(), 1);

        harness.element.disconnect();
        assert_eq!(harness.window.listener_count(), 0);
        harness.element.connect();
        assert_eq!(harness.window.listener_count(), 1);

        let before = harness.stats();
        for _ in 0..3 {
            harness.window.dispatch(WindowSignal::Resize);
        }
        harness.poll();
        harness.advance(250);
        assert_eq!(harness.stats().size_invalidations, before.size_invalidations + 1);
        assert_eq!(harness.stats().bounds_fits, before.bounds_fits + 1);
    }

    #[test]
    fn test_disconnect_drops_pending_resize() {
        let mut harness = mounted(|element| element.set_radius(300.0).unwrap());
        let before = harness.stats();

        harness.window.dispatch(WindowSignal::Resize);
        harness.poll();
        harness.element.disconnect();
        harness.advance(500);

        assert_eq!(harness.stats(), before);
    }

    #[test]
    fn test_attributes_from_strings() {
        let mut harness = mounted(|_| {});
        let markers = serde_json::to_string(&stations()).unwrap();

        harness.element.set_attribute("radius", Some("120")).unwrap();
        harness.element.set_attribute("markers", Some(markers.as_str())).unwrap();
        harness.poll();

        assert_eq!(harness.map.borrow().circles()[0].radius(), 120.0);
        assert_eq!(harness.element.marker_layers().len(), 3);
        assert!(harness.element.set_attribute("radius", Some("wide")).is_err());
        assert!(harness.element.set_attribute("radius", Some("Infinity")).is_err());
        assert!(harness.element.set_attribute("pitch", Some("1")).is_err());

        assert_eq!(harness.element.state().radius, 120.0);
        harness.poll();
        assert_eq!(harness.map.borrow().circles().len(), 1);
        assert_eq!(harness.map.borrow().circles()[0].radius(), 120.0);
    }

    #[test]
    fn test_zero_latitude_leaves_map_alone() {
        let mut harness = mounted(|_| {});
        let marker = harness.element.center_marker().unwrap().to_string();
        let before = harness.stats();

        harness.element.set_latitude(0.0);
        harness.poll();

        assert_eq!(harness.element.center_marker(), Some(marker.as_str()));
        assert_eq!(harness.stats().pans, before.pans);
    }
}
