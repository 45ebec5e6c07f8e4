pub struct DefaultsConfig {
    pub bin_step: f64,
    pub nstereo: usize,
    pub nconf: usize,
    pub seed: i64,
    pub ncpu: usize,
    pub toolkit_program: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            bin_step: 1.0,
            nstereo: 5,
            nconf: 50,
            seed: -1,
            ncpu: 1,
            toolkit_program: "psearch-toolkit".to_string(),
        }
    }
}
