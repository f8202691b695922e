use tracing::{debug, info, warn};

use crate::controller::Campus;
use crate::error::ProviderError;
use crate::providers::{Directions, Geolocation, RouteRequest, TravelMode};
use crate::surface::MapSurface;

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    NoDestination,
    /// Positioning or directions failed; the map is unchanged.
    Failed(ProviderError),
    /// A newer route request was issued while this one was in flight.
    Superseded,
    Shown,
}

impl<M, P> Campus<M, P>
where
    M: MapSurface,
    P: Geolocation + Directions<Route = M::Route>,
{
    /// Routes from the device's current position to the selected destination.
    pub async fn plan_route(&self) -> RouteOutcome {
        let Some(destination) = self.destination() else {
            info!("no destination selected; nothing to route to");
            return RouteOutcome::NoDestination;
        };
        let seq = self.sequencer.borrow_mut().route.next_id();

        let origin = match self.providers.current_position().await {
            Ok(origin) => origin,
            Err(err) => {
                warn!("could not determine current position: {err}");
                return RouteOutcome::Failed(err);
            }
        };

        let request = RouteRequest {
            origin,
            destination,
            travel_mode: TravelMode::Driving,
        };
        let route = match self.providers.route(&request).await {
            Ok(route) => route,
            Err(err) => {
                warn!("directions request failed: {err}");
                return RouteOutcome::Failed(err);
            }
        };

        if !self.sequencer.borrow().route.is_latest(seq) {
            debug!("dropping superseded route #{}", seq.get());
            return RouteOutcome::Superseded;
        }

        let mut surface = self.surface.borrow_mut();
        self.state.borrow_mut().show_route(&mut surface, &route);
        info!(
            "route shown to {}, {} ({})",
            destination.lat,
            destination.lng,
            request.travel_mode.as_str()
        );
        RouteOutcome::Shown
    }
}
