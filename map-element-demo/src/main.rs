use anyhow::Context;
use map_element::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(3);

/// Mounts an element on the headless engine, clicks once, resizes a few times
/// and prints where everything ended up.
///
/// Usage: `map-element-demo '[{"latitude": 47.37, "longitude": 8.54, "title": "HB"}]'`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let window = WindowEvents::new();
    let mut element: MapElement<Map> = MapElement::new(window.clone());
    element.set_update_center_on_click(true);
    element.set_radius(250.0)?;

    if let Some(markers) = std::env::args().nth(1) {
        let markers: Vec<MarkerInformation> =
            serde_json::from_str(&markers).context("first argument must be a JSON marker list")?;
        log::info!("showing {} markers", markers.len());
        element.set_markers(markers);
    }

    let recentered = Rc::new(RefCell::new(None));
    let tiles = Rc::new(RefCell::new(Vec::new()));

    element.on("map-ready", |_| log::info!("map ready"));
    {
        let recentered = Rc::clone(&recentered);
        element.on("center-updated", move |notification| {
            if let ElementEvent::CenterUpdated(center) = &notification.event {
                log::info!("center updated to {:.5}, {:.5}", center.lat, center.lng);
                *recentered.borrow_mut() = Some(*center);
            }
        });
    }
    {
        let tiles = Rc::clone(&tiles);
        element.on("tiles-loading", move |notification| {
            if let ElementEvent::TilesLoading(loaded) = &notification.event {
                tiles.borrow_mut().push(loaded.clone());
            }
        });
    }

    element.connect();
    let map = element.mount(Map::new(MapOptions::default()))?;
    map.borrow_mut().set_container_size(Point::new(1024.0, 768.0));

    let view_changes = Arc::new(AtomicUsize::new(0));
    {
        let view_changes = Arc::clone(&view_changes);
        map.borrow_mut().on("viewchanged", move |event| {
            if let MapEvent::ViewChanged { center, zoom } = event {
                log::debug!("view moved to {:.5}, {:.5} @ {}", center.lat, center.lng, zoom);
            }
            view_changes.fetch_add(1, Ordering::Relaxed);
        });
    }
    element.poll()?;

    let clicked = map.borrow_mut().click_at(Point::new(620.0, 280.0));
    log::info!("clicked at {:.5}, {:.5}", clicked.lat, clicked.lng);
    for _ in 0..5 {
        window.dispatch(WindowSignal::Resize);
    }

    let started = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_millis(50));
    loop {
        ticker.tick().await;
        element.poll()?;
        map.borrow_mut().complete_tile_loading();

        let settled = recentered.borrow().is_some()
            && !element.is_click_pending()
            && !element.is_resize_pending()
            && !element.is_update_requested();
        if settled {
            break;
        }
        if started.elapsed() > SETTLE_TIMEOUT {
            anyhow::bail!("element did not settle within {:?}", SETTLE_TIMEOUT);
        }
    }

    let map = map.borrow();
    let viewport = map.viewport();
    let loaded = tiles.borrow().iter().filter(|t| t.is_loaded()).count();

    println!(
        "view: {:.5}, {:.5} @ zoom {}",
        viewport.center.lat, viewport.center.lng, viewport.zoom
    );
    println!("markers on map: {}", map.markers().len());
    println!("view changes: {}", view_changes.load(Ordering::Relaxed));
    println!("tile loading cycles: {} ({} finished)", tiles.borrow().len(), loaded);
    if let Some(scale) = map.scale_label() {
        println!("scale: {}", scale);
    }
    println!("{:#?}", map.stats());

    Ok(())
}
