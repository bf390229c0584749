quantity!(
    /// Spot price as published upstream, Swedish kronor per kilowatt-hour.
    KilowattHourPrice, "SEK/kWh", precision: 4
);

quantity!(
    /// Display price, [öre](https://en.wikipedia.org/wiki/%C3%96re) per kilowatt-hour.
    OrePerKilowattHour, "öre", precision: 2
);

impl KilowattHourPrice {
    /// Convert to öre, rounded to two decimals.
    ///
    /// Non-representable results (`NaN`) collapse to zero.
    #[must_use]
    pub fn to_ore(self) -> OrePerKilowattHour {
        let ore = (self.0 * 100.0 * 100.0).round() / 100.0;
        if ore.is_nan() { OrePerKilowattHour::ZERO } else { OrePerKilowattHour(ore) }
    }
}
