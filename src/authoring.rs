//! Interactive route drawing.
//!
//! An operator selects a gate, clicks points on the measured image and then
//! commits the line under a destination name, or cancels it. At most one
//! session exists at a time. Nothing reaches the site until a commit
//! succeeds.

use crate::error::{Error, Result};
use crate::geometry::{ImageSize, PixelPoint, Point};
use crate::model::Route;
use crate::overlay;
use crate::site::Site;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoringState {
    Idle,
    GateSelected,
    Drawing,
}

/// The line being drawn. Holds the gate by name only; the site stays the
/// owner of gates.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSession {
    gate_name: String,
    line: Vec<Point>,
}

impl DrawingSession {
    pub fn gate_name(&self) -> &str {
        &self.gate_name
    }

    pub fn line(&self) -> &[Point] {
        &self.line
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteAuthoring {
    session: Option<DrawingSession>,
}

impl RouteAuthoring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthoringState {
        match &self.session {
            None => AuthoringState::Idle,
            Some(session) if session.line.is_empty() => AuthoringState::GateSelected,
            Some(_) => AuthoringState::Drawing,
        }
    }

    pub fn session(&self) -> Option<&DrawingSession> {
        self.session.as_ref()
    }

    pub fn selected_gate(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.gate_name.as_str())
    }

    pub fn line(&self) -> &[Point] {
        self.session
            .as_ref()
            .map(|session| session.line.as_slice())
            .unwrap_or(&[])
    }

    /// Starts a session on `gate_name`. Selecting the gate already being
    /// drawn from keeps the current line; any other gate is refused until
    /// the active session is committed or cancelled.
    pub fn select_gate<S: KeyValueStore>(&mut self, site: &Site<S>, gate_name: &str) -> Result<()> {
        if let Some(session) = &self.session {
            if session.gate_name == gate_name {
                return Ok(());
            }
            return Err(Error::SessionBusy(session.gate_name.clone()));
        }
        if site.gate(gate_name).is_none() {
            return Err(Error::UnknownGate(gate_name.to_string()));
        }
        log::debug!("drawing session started from gate `{gate_name}`");
        self.session = Some(DrawingSession {
            gate_name: gate_name.to_string(),
            line: Vec::new(),
        });
        Ok(())
    }

    /// Records a click at pixel `(px, py)` on an image currently measured at
    /// `width` x `height`.
    pub fn add_point(&mut self, px: f64, py: f64, width: f64, height: f64) -> Result<Point> {
        let session = self.session.as_mut().ok_or(Error::NoActiveSession)?;
        let size = ImageSize::measured(width, height).ok_or(Error::MeasurementUnavailable)?;
        let point = size.to_normalized(px, py);
        session.line.push(point);
        log::debug!(
            "point {} at ({}, {}) from gate `{}`",
            session.line.len(),
            point.x(),
            point.y(),
            session.gate_name
        );
        Ok(point)
    }

    /// Stores the buffered line as a route to `destination`.
    ///
    /// On failure the session is kept intact so the operator can fix the
    /// input and retry, or cancel. The gate is re-checked against the site,
    /// so a gate deleted mid-session fails with [`Error::UnknownGate`].
    pub fn commit<S: KeyValueStore>(&mut self, site: &mut Site<S>, destination: &str) -> Result<Route> {
        let session = self.session.as_ref().ok_or(Error::NoActiveSession)?;
        let route = site.add_route(&session.gate_name, destination, session.line.clone())?;
        self.session = None;
        Ok(route)
    }

    /// Discards the session. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                log::debug!(
                    "drawing session from `{}` cancelled with {} point(s)",
                    session.gate_name,
                    session.line.len()
                );
                true
            }
            None => false,
        }
    }

    /// Pixel polyline of the line being drawn, for the live image size.
    pub fn preview(&self, width: f64, height: f64) -> Vec<PixelPoint> {
        overlay::render_overlay(self.line(), width, height)
    }
}
