//! Demo fixtures written by `adapteval init --demo`.

pub const GITIGNORE: &str = "/out/\n*.log\n";

pub const DEMO_QUESTIONS: [&str; 2] = [
    "How should a mid-sized Baltic port prepare its infrastructure for projected sea level rise by 2050?",
    "What adaptation measures reduce heat stress risk for outdoor workers in southern European agriculture?",
];

/// (agent, question index, response text). Every agent answers every
/// demo question so the validate command passes on a fresh tree.
pub fn demo_responses() -> Vec<(&'static str, usize, &'static str)> {
    vec![
        (
            "Plain-LLM",
            0,
            "### Executive summary\nElevate critical quay infrastructure and revise drainage design storms.\n---\n### Credibility\nBased on regional sea level projections.\n### Uncertainty\nScenario spread of 0.3-0.7 m by 2050.\n### Actionability\nStart with a vulnerability screening of berths.\n",
        ),
        (
            "Plain-LLM",
            1,
            "### Executive summary\nShift harvest windows and mandate shaded rest breaks.\n### Credibility\nConsistent with occupational heat guidance.\n### Uncertainty\nLocal microclimate variation is large.\n### Actionability\nAdopt a wet-bulb threshold work policy.\n",
        ),
        (
            "Climsight",
            0,
            "### Executive summary\nCombine grey and nature-based protection for the outer harbour.\n### Credibility\nDownscaled projections for the Baltic basin.\n### Uncertainty\nStorm surge interaction remains the main unknown.\n### Actionability\nSequence investments against observed trigger levels.\n",
        ),
        (
            "Climsight",
            1,
            "### Executive summary\nReschedule field operations to early morning hours.\n### Credibility\nRegional heat index climatology.\n### Uncertainty\nProjection agreement is high for summer means.\n### Actionability\nInstall shaded stations per field block.\n",
        ),
        (
            "Climsight-XCLIM",
            0,
            "### Executive summary\nPrioritise drainage capacity before quay elevation.\n### Credibility\nIndicator-based analysis of extreme water levels.\n### Uncertainty\nReturn-period estimates carry wide intervals.\n### Actionability\nUpdate design codes to the 2050 indicator set.\n",
        ),
        (
            "Climsight-XCLIM",
            1,
            "### Executive summary\nUse heat indicator thresholds to trigger work stoppages.\n### Credibility\nComputed from bias-adjusted ensembles.\n### Uncertainty\nInter-model spread is moderate.\n### Actionability\nIntegrate thresholds into labour agreements.\n",
        ),
        (
            "XCLIM-AI",
            0,
            "### Executive summary\nAdaptive pathway planning for the port masterplan.\n### Credibility\nCombines indicators with local monitoring.\n### Uncertainty\nPathway switch points bound the uncertainty.\n### Actionability\nDefine monitoring triggers this budget cycle.\n",
        ),
        (
            "XCLIM-AI",
            1,
            "### Executive summary\nCombine agronomic and occupational measures.\n### Credibility\nIndicator evidence plus extension-service practice.\n### Uncertainty\nAdoption rates dominate outcome uncertainty.\n### Actionability\nPilot in two municipalities next season.\n",
        ),
    ]
}
