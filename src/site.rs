//! The site aggregate: image reference, gates and routes, persisted through
//! an injected [`KeyValueStore`].
//!
//! Every mutation builds the next collection first, writes it to the store
//! and only then replaces the in-memory state. A failed write leaves both
//! the store and the in-memory site as they were.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::model::{Gate, Route, SiteSnapshot};
use crate::store::{KeyValueStore, SITE_GATES_KEY, SITE_IMAGE_KEY, SITE_ROUTES_KEY};

#[derive(Debug)]
pub struct Site<S> {
    store: S,
    image: Option<String>,
    gates: Vec<Gate>,
    routes: Vec<Route>,
}

impl<S: KeyValueStore> Site<S> {
    /// Reads the three site records. Missing keys mean an empty site;
    /// records breaking the gate/route invariants are dropped.
    pub fn load(store: S) -> Result<Self> {
        let image = store.get(SITE_IMAGE_KEY)?.filter(|value| !value.is_empty());
        let stored_gates: Vec<Gate> = read_json(&store, SITE_GATES_KEY)?;
        let stored_routes: Vec<Route> = read_json(&store, SITE_ROUTES_KEY)?;

        let mut gates: Vec<Gate> = Vec::with_capacity(stored_gates.len());
        for gate in stored_gates {
            if gate.name.trim().is_empty() {
                log::warn!("dropping stored gate with an empty name");
            } else if gates.iter().any(|existing| existing.name == gate.name) {
                log::warn!("dropping duplicate stored gate `{}`", gate.name);
            } else {
                gates.push(gate);
            }
        }

        let known: HashSet<&str> = gates.iter().map(|gate| gate.name.as_str()).collect();
        let routes: Vec<Route> = stored_routes
            .into_iter()
            .filter(|route| {
                if !known.contains(route.gate_name.as_str()) {
                    log::warn!(
                        "dropping stored route to `{}` from unknown gate `{}`",
                        route.destination,
                        route.gate_name
                    );
                    false
                } else if route.destination.trim().is_empty() {
                    log::warn!("dropping stored route from `{}` without a destination", route.gate_name);
                    false
                } else if route.line.len() < 2 {
                    log::warn!(
                        "dropping stored route `{}` -> `{}` with {} point(s)",
                        route.gate_name,
                        route.destination,
                        route.line.len()
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        log::debug!("loaded site with {} gates and {} routes", gates.len(), routes.len());
        Ok(Self {
            store,
            image,
            gates,
            routes,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn gate(&self, name: &str) -> Option<&Gate> {
        self.gates.iter().find(|gate| gate.name == name)
    }

    /// Routes leaving `gate_name`, in insertion order.
    pub fn routes_for_gate(&self, gate_name: &str) -> Vec<&Route> {
        self.routes
            .iter()
            .filter(|route| route.gate_name == gate_name)
            .collect()
    }

    pub fn route_for(&self, gate_name: &str, destination: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.is_for(gate_name, destination))
    }

    pub fn snapshot(&self) -> SiteSnapshot {
        SiteSnapshot {
            site_image: self.image.clone(),
            site_gates: self.gates.clone(),
            site_routes: self.routes.clone(),
        }
    }

    pub fn set_image(&mut self, reference: impl Into<String>) -> Result<()> {
        let reference = reference.into();
        self.commit(&[(SITE_IMAGE_KEY, reference.clone())])?;
        log::info!("site image set ({} bytes)", reference.len());
        self.image = Some(reference);
        Ok(())
    }

    pub fn add_gate(&mut self, name: &str, position: Point) -> Result<Gate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        if self.gate(name).is_some() {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let gate = Gate::new(name, position);
        let mut next = self.gates.clone();
        next.push(gate.clone());
        self.commit(&[(SITE_GATES_KEY, to_json(&next)?)])?;
        self.gates = next;

        log::info!(
            "added gate `{}` at ({}, {})",
            gate.name,
            gate.position.x(),
            gate.position.y()
        );
        Ok(gate)
    }

    /// Removes the gate and every route leaving it in one commit.
    pub fn delete_gate(&mut self, name: &str) -> Result<Gate> {
        let index = self
            .gates
            .iter()
            .position(|gate| gate.name == name)
            .ok_or_else(|| Error::NotFound(format!("gate `{name}`")))?;

        let mut next_gates = self.gates.clone();
        let removed = next_gates.remove(index);
        let next_routes: Vec<Route> = self
            .routes
            .iter()
            .filter(|route| route.gate_name != name)
            .cloned()
            .collect();
        let cascaded = self.routes.len() - next_routes.len();

        self.commit(&[
            (SITE_ROUTES_KEY, to_json(&next_routes)?),
            (SITE_GATES_KEY, to_json(&next_gates)?),
        ])?;
        self.gates = next_gates;
        self.routes = next_routes;

        log::info!("deleted gate `{name}` and {cascaded} route(s)");
        Ok(removed)
    }

    pub fn add_route(&mut self, gate_name: &str, destination: &str, line: Vec<Point>) -> Result<Route> {
        if self.gate(gate_name).is_none() {
            return Err(Error::UnknownGate(gate_name.to_string()));
        }
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::InvalidDestination);
        }
        if line.len() < 2 {
            return Err(Error::InsufficientPoints(line.len()));
        }
        if self.route_for(gate_name, destination).is_some() {
            return Err(Error::DuplicateRoute {
                gate: gate_name.to_string(),
                destination: destination.to_string(),
            });
        }

        let route = Route::new(gate_name, destination, line);
        let mut next = self.routes.clone();
        next.push(route.clone());
        self.commit(&[(SITE_ROUTES_KEY, to_json(&next)?)])?;
        self.routes = next;

        log::info!(
            "added route `{}` -> `{}` with {} points",
            route.gate_name,
            route.destination,
            route.line.len()
        );
        Ok(route)
    }

    pub fn delete_route(&mut self, index: usize) -> Result<Route> {
        if index >= self.routes.len() {
            return Err(Error::NotFound(format!("route #{index}")));
        }
        let mut next = self.routes.clone();
        let removed = next.remove(index);
        self.commit(&[(SITE_ROUTES_KEY, to_json(&next)?)])?;
        self.routes = next;

        log::info!(
            "deleted route `{}` -> `{}`",
            removed.gate_name,
            removed.destination
        );
        Ok(removed)
    }

    pub fn delete_route_for(&mut self, gate_name: &str, destination: &str) -> Result<Route> {
        let index = self
            .routes
            .iter()
            .position(|route| route.is_for(gate_name, destination))
            .ok_or_else(|| Error::NotFound(format!("route `{gate_name}` -> `{destination}`")))?;
        self.delete_route(index)
    }

    /// Writes every entry or none of them.
    fn commit(&mut self, writes: &[(&'static str, String)]) -> Result<()> {
        let mut before: Vec<(&'static str, Option<String>)> = Vec::with_capacity(writes.len());
        for (key, _) in writes {
            before.push((*key, self.store.get(key)?));
        }
        for (written, (key, value)) in writes.iter().enumerate() {
            if let Err(err) = self.store.set(key, value) {
                self.rollback(&before[..written]);
                return Err(err.into());
            }
        }
        Ok(())
    }

    fn rollback(&mut self, written: &[(&'static str, Option<String>)]) {
        for (key, before) in written.iter().rev() {
            log::warn!("restoring `{key}` after a failed write");
            let restored = match before {
                Some(value) => self.store.set(key, value),
                None => self.store.remove(key),
            };
            if let Err(err) = restored {
                log::warn!("could not restore `{key}`: {err}");
            }
        }
    }
}

fn read_json<T, S>(store: &S, key: &'static str) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore,
{
    match store.get(key)? {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|source| Error::Decode { key, source })
        }
        _ => Ok(Vec::new()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|source| Error::Decode {
        key: "encode",
        source,
    })
}
