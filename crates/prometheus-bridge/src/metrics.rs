use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

pub struct SimulationMetrics {
    registry: Registry,
    pub ticks_total: IntCounterVec,
    pub prediction_errors_total: IntCounterVec,
    pub sessions_stopped_total: IntCounterVec,
    pub temperature_celsius: GaugeVec,
    pub humidity_percent: GaugeVec,
    pub heart_rate_bpm: GaugeVec,
    pub risk_score: GaugeVec,
}

impl SimulationMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let ticks_total = IntCounterVec::new(
            Opts::new("heatsim_ticks_total", "Subject updates published, by outcome"),
            &["subject", "outcome"],
        )?;
        let prediction_errors_total = IntCounterVec::new(
            Opts::new(
                "heatsim_prediction_errors_total",
                "Predictor failures by classified kind",
            ),
            &["kind", "direction"],
        )?;
        let sessions_stopped_total = IntCounterVec::new(
            Opts::new("heatsim_sessions_stopped_total", "Finished sessions by stop reason"),
            &["reason", "direction"],
        )?;
        let temperature_celsius = GaugeVec::new(
            Opts::new("heatsim_temperature_celsius", "Latest simulated ambient temperature"),
            &["subject"],
        )?;
        let humidity_percent = GaugeVec::new(
            Opts::new("heatsim_humidity_percent", "Latest simulated relative humidity"),
            &["subject"],
        )?;
        let heart_rate_bpm = GaugeVec::new(
            Opts::new("heatsim_heart_rate_bpm", "Latest simulated mean heart rate"),
            &["subject"],
        )?;
        let risk_score = GaugeVec::new(
            Opts::new("heatsim_risk_score", "Latest predicted heat-stress risk score"),
            &["subject"],
        )?;

        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(prediction_errors_total.clone()))?;
        registry.register(Box::new(sessions_stopped_total.clone()))?;
        registry.register(Box::new(temperature_celsius.clone()))?;
        registry.register(Box::new(humidity_percent.clone()))?;
        registry.register(Box::new(heart_rate_bpm.clone()))?;
        registry.register(Box::new(risk_score.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            prediction_errors_total,
            sessions_stopped_total,
            temperature_celsius,
            humidity_percent,
            heart_rate_bpm,
            risk_score,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
