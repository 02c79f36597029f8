/*
 *  span.rs
 *
 *  LumiPane - pixels on cue
 *  (c) 2020-26 Stuart Hunter
 *
 *  Versioned capability protocol through which audio producers feed
 *  spectrum/volume/peak data and query display availability
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Capability token for the availability query
pub const SPAN_CLIENT_CHECK: &str = "client-check-v1";

/// Capability token for spectrum data exchange
pub const SPAN_GET_BAR_HEIGHTS: &str = "get-bar-heights-v1";

/// A caller that has not asked for data in this long is forgotten
const CLIENT_STALE_AFTER: Duration = Duration::from_secs(60);

/// Capabilities this engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ClientCheck,
    GetBarHeights,
}

/// A capability plus its negotiated major version.
///
/// Tokens read `<name>-v<major>`. An unknown name or a major this build does
/// not speak yields Unsupported; callers treat that as a normal negative,
/// never a fault, so independently updated components can probe freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityId {
    pub capability: Capability,
    pub version: u32,
}

impl CapabilityId {
    pub fn parse(token: &str) -> Result<Self, SpanError> {
        let (name, ver) = token
            .rsplit_once("-v")
            .ok_or_else(|| SpanError::Unsupported(token.to_string()))?;
        let version: u32 = ver
            .parse()
            .map_err(|_| SpanError::Unsupported(token.to_string()))?;
        let capability = match name {
            "client-check" => Capability::ClientCheck,
            "get-bar-heights" => Capability::GetBarHeights,
            _ => return Err(SpanError::Unsupported(token.to_string())),
        };
        if version != 1 {
            // future majors negotiate down by probing v1; we never guess
            return Err(SpanError::Unsupported(token.to_string()));
        }
        Ok(Self { capability, version })
    }
}

/// Protocol-level error. Unsupported is the compatible negative; only
/// InvalidRequest indicates a malformed payload.
#[derive(Debug, PartialEq, Eq)]
pub enum SpanError {
    /// Capability token unknown to this engine (normal negative)
    Unsupported(String),
    /// Malformed payload, e.g. a band count of zero; nothing was written
    InvalidRequest(String),
    /// Request variant does not match the capability token
    Mismatch,
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::Unsupported(token) =>
                write!(f, "Capability not supported: {}", token),
            SpanError::InvalidRequest(msg) =>
                write!(f, "Invalid request: {}", msg),
            SpanError::Mismatch =>
                write!(f, "Request payload does not match capability token"),
        }
    }
}

impl std::error::Error for SpanError {}

/// Request payloads, one per capability
#[derive(Debug)]
pub enum SpanRequest {
    ClientCheck,
    GetBarHeights(BarHeightsRequest),
}

#[derive(Debug, Clone)]
pub struct BarHeightsRequest {
    /// Unique per caller; keys the registration so simultaneous data sinks
    /// keep independent band counts and peak state
    pub caller: String,
    /// Number of bands to compute, must be nonzero
    pub bands: usize,
    /// Maximum per-tick decay of a displayed peak
    pub falloff: u32,
}

/// Response payloads; buffers are freshly allocated copies, no caller
/// storage is retained past the call
#[derive(Debug)]
pub enum SpanResponse {
    ClientCheck(ClientCheck),
    BarHeights(BarHeights),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientCheck {
    /// The display engine is enabled at all
    pub is_active: bool,
    /// The engine is currently willing to render this kind of data
    pub is_running: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BarHeights {
    pub bar_heights: Vec<u32>,
    pub bar_heights_left: Vec<u32>,
    pub bar_heights_right: Vec<u32>,
    pub volume_left: u32,
    pub volume_right: u32,
    pub volume_both: u32,
    pub peaks_both: Vec<u32>,
    pub peaks_left: Vec<u32>,
    pub peaks_right: Vec<u32>,
}

/// Per-caller registration: band count, falloff and the peak state that
/// decays on engine ticks
#[derive(Debug)]
struct SpanClient {
    bands: usize,
    falloff: u32,
    peaks_both: Vec<u32>,
    peaks_left: Vec<u32>,
    peaks_right: Vec<u32>,
    last_seen: Instant,
}

/// Shared spectrum state.
///
/// Lives inside the engine's single exclusive section; protocol calls and
/// the scheduler's snapshot both hold that lock only for the copy.
pub struct SpanState {
    /// Latest pushed frame, normalized 0..=255 per band
    bands_left: Vec<u8>,
    bands_right: Vec<u8>,
    volume_left: u32,
    volume_right: u32,
    clients: HashMap<String, SpanClient>,
    last_push: Option<Instant>,
}

impl SpanState {
    pub fn new() -> Self {
        Self {
            bands_left: Vec::new(),
            bands_right: Vec::new(),
            volume_left: 0,
            volume_right: 0,
            clients: HashMap::new(),
            last_push: None,
        }
    }

    /// Latest audio frame from a producer. Channel band counts may differ
    /// per producer; data is resampled per registration on read.
    pub fn push_audio_frame(&mut self, left: &[u8], right: &[u8], volume_left: u32, volume_right: u32, now: Instant) {
        self.bands_left = left.to_vec();
        self.bands_right = right.to_vec();
        self.volume_left = volume_left;
        self.volume_right = volume_right;
        self.last_push = Some(now);
    }

    pub fn has_data(&self) -> bool {
        self.last_push.is_some()
    }

    pub fn volume_both(&self) -> u32 {
        (self.volume_left + self.volume_right) / 2
    }

    /// Bands for the renderer at the given count, both channels combined
    pub fn combined_bands(&self, bands: usize) -> Vec<u8> {
        let l = resample(&self.bands_left, bands);
        let r = resample(&self.bands_right, bands);
        l.iter().zip(r.iter()).map(|(&a, &b)| a.max(b)).collect()
    }

    /// Decay every registered caller's peaks by its own falloff, lifting
    /// them where the current bars exceed the held peak. Callers that have
    /// stopped asking are dropped.
    pub fn tick(&mut self, now: Instant) {
        self.clients
            .retain(|_, c| now.duration_since(c.last_seen) < CLIENT_STALE_AFTER);

        // collect first: decay needs &mut clients while reading band state
        let per_client: Vec<(String, Vec<u32>, Vec<u32>, Vec<u32>)> = self
            .clients
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    to_u32(&self.combined_bands(c.bands)),
                    to_u32(&resample(&self.bands_left, c.bands)),
                    to_u32(&resample(&self.bands_right, c.bands)),
                )
            })
            .collect();

        for (name, both, left, right) in per_client {
            let client = self.clients.get_mut(&name).unwrap();
            decay_peaks(&mut client.peaks_both, &both, client.falloff);
            decay_peaks(&mut client.peaks_left, &left, client.falloff);
            decay_peaks(&mut client.peaks_right, &right, client.falloff);
        }
    }

    /// Serve a get-bar-heights request: (re)register the caller and copy the
    /// current values out. A changed band count for a known name is a
    /// re-registration, not an error.
    pub fn get_bar_heights(&mut self, req: &BarHeightsRequest, now: Instant) -> Result<BarHeights, SpanError> {
        if req.bands == 0 {
            return Err(SpanError::InvalidRequest("band count must be nonzero".into()));
        }
        if req.caller.is_empty() {
            return Err(SpanError::InvalidRequest("caller name must not be empty".into()));
        }

        let client = self
            .clients
            .entry(req.caller.clone())
            .or_insert_with(|| SpanClient {
                bands: req.bands,
                falloff: req.falloff,
                peaks_both: vec![0; req.bands],
                peaks_left: vec![0; req.bands],
                peaks_right: vec![0; req.bands],
                last_seen: now,
            });
        if client.bands != req.bands {
            log::debug!("span: caller {} re-registered, {} -> {} bands", req.caller, client.bands, req.bands);
            client.bands = req.bands;
            client.peaks_both = vec![0; req.bands];
            client.peaks_left = vec![0; req.bands];
            client.peaks_right = vec![0; req.bands];
        }
        client.falloff = req.falloff;
        client.last_seen = now;

        let both = to_u32(&self.combined_bands(req.bands));
        let left = to_u32(&resample(&self.bands_left, req.bands));
        let right = to_u32(&resample(&self.bands_right, req.bands));
        let volume_both = self.volume_both();

        let client = self.clients.get_mut(&req.caller).unwrap();
        lift_peaks(&mut client.peaks_both, &both);
        lift_peaks(&mut client.peaks_left, &left);
        lift_peaks(&mut client.peaks_right, &right);

        Ok(BarHeights {
            bar_heights: both,
            bar_heights_left: left,
            bar_heights_right: right,
            volume_left: self.volume_left,
            volume_right: self.volume_right,
            volume_both,
            peaks_both: client.peaks_both.clone(),
            peaks_left: client.peaks_left.clone(),
            peaks_right: client.peaks_right.clone(),
        })
    }

    /// Registered band count for a caller, if any (test/introspection)
    pub fn registered_bands(&self, caller: &str) -> Option<usize> {
        self.clients.get(caller).map(|c| c.bands)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl Default for SpanState {
    fn default() -> Self {
        Self::new()
    }
}

fn to_u32(bands: &[u8]) -> Vec<u32> {
    bands.iter().map(|&b| b as u32).collect()
}

/// Box-average a band vector to `count` entries
fn resample(src: &[u8], count: usize) -> Vec<u8> {
    if count == 0 {
        return Vec::new();
    }
    if src.is_empty() {
        return vec![0; count];
    }
    (0..count)
        .map(|i| {
            let lo = i * src.len() / count;
            let hi = (((i + 1) * src.len()) / count).max(lo + 1).min(src.len());
            let sum: u32 = src[lo..hi].iter().map(|&b| b as u32).sum();
            (sum / (hi - lo) as u32) as u8
        })
        .collect()
}

fn decay_peaks(peaks: &mut [u32], bars: &[u32], falloff: u32) {
    for (peak, &bar) in peaks.iter_mut().zip(bars.iter()) {
        let decayed = peak.saturating_sub(falloff);
        *peak = decayed.max(bar);
    }
}

fn lift_peaks(peaks: &mut [u32], bars: &[u32]) {
    for (peak, &bar) in peaks.iter_mut().zip(bars.iter()) {
        if bar > *peak {
            *peak = bar;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_parse_accepts_known_v1() {
        let id = CapabilityId::parse(SPAN_CLIENT_CHECK).unwrap();
        assert_eq!(id.capability, Capability::ClientCheck);
        assert_eq!(id.version, 1);

        let id = CapabilityId::parse(SPAN_GET_BAR_HEIGHTS).unwrap();
        assert_eq!(id.capability, Capability::GetBarHeights);
    }

    #[test]
    fn unknown_tokens_are_a_normal_negative() {
        for token in ["get-bar-heights-v2", "wibble-v1", "client-check", ""] {
            match CapabilityId::parse(token) {
                Err(SpanError::Unsupported(t)) => assert_eq!(t, token),
                other => panic!("expected Unsupported for {:?}, got {:?}", token, other),
            }
        }
    }

    #[test]
    fn zero_bands_rejected_without_partial_write() {
        let mut state = SpanState::new();
        let req = BarHeightsRequest { caller: "musicplayer".into(), bands: 0, falloff: 2 };
        assert!(matches!(state.get_bar_heights(&req, Instant::now()), Err(SpanError::InvalidRequest(_))));
        assert_eq!(state.client_count(), 0);
    }

    #[test]
    fn distinct_callers_keep_independent_registrations() {
        let mut state = SpanState::new();
        let now = Instant::now();
        state.push_audio_frame(&[200; 32], &[100; 32], 60, 40, now);

        let a = BarHeightsRequest { caller: "musicplayer".into(), bands: 20, falloff: 2 };
        let b = BarHeightsRequest { caller: "dvbrecorder".into(), bands: 8, falloff: 10 };
        let ra = state.get_bar_heights(&a, now).unwrap();
        let rb = state.get_bar_heights(&b, now).unwrap();

        assert_eq!(ra.bar_heights.len(), 20);
        assert_eq!(rb.bar_heights.len(), 8);
        assert_eq!(state.registered_bands("musicplayer"), Some(20));
        assert_eq!(state.registered_bands("dvbrecorder"), Some(8));
        assert_eq!(ra.volume_both, 50);
    }

    #[test]
    fn band_count_change_is_re_registration() {
        let mut state = SpanState::new();
        let now = Instant::now();
        let req = BarHeightsRequest { caller: "musicplayer".into(), bands: 20, falloff: 2 };
        state.get_bar_heights(&req, now).unwrap();

        let req = BarHeightsRequest { caller: "musicplayer".into(), bands: 12, falloff: 2 };
        let r = state.get_bar_heights(&req, now).unwrap();
        assert_eq!(r.bar_heights.len(), 12);
        assert_eq!(state.registered_bands("musicplayer"), Some(12));
        assert_eq!(state.client_count(), 1);
    }

    #[test]
    fn peaks_fall_no_faster_than_falloff() {
        let mut state = SpanState::new();
        let now = Instant::now();
        state.push_audio_frame(&[255; 16], &[255; 16], 80, 80, now);

        let req = BarHeightsRequest { caller: "musicplayer".into(), bands: 16, falloff: 3 };
        let r = state.get_bar_heights(&req, now).unwrap();
        assert!(r.peaks_both.iter().all(|&p| p == 255));

        // signal drops to silence; peaks decay by at most falloff per tick
        state.push_audio_frame(&[0; 16], &[0; 16], 0, 0, now);
        let mut prev = r.peaks_both.clone();
        for _ in 0..10 {
            state.tick(now);
            let r = state.get_bar_heights(&req, now).unwrap();
            for (p, q) in prev.iter().zip(r.peaks_both.iter()) {
                assert!(p - q <= 3);
            }
            prev = r.peaks_both.clone();
        }
    }

    #[test]
    fn silent_callers_are_forgotten() {
        let mut state = SpanState::new();
        let now = Instant::now();
        let req = BarHeightsRequest { caller: "musicplayer".into(), bands: 8, falloff: 2 };
        state.get_bar_heights(&req, now).unwrap();
        assert_eq!(state.client_count(), 1);

        state.tick(now);
        assert_eq!(state.client_count(), 1);
        state.tick(now + Duration::from_secs(61));
        assert_eq!(state.client_count(), 0);
    }

    #[test]
    fn resample_preserves_energy_shape() {
        assert_eq!(resample(&[10, 20, 30, 40], 2), vec![15, 35]);
        assert_eq!(resample(&[], 3), vec![0, 0, 0]);
        assert_eq!(resample(&[7], 3), vec![7, 7, 7]);
    }
}
