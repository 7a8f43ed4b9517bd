// Static text of the dashboard page.

pub const PAGE_TITLE: &str = "Cancer Related Prevalence in Scotland's General Practices by Regional Health Board 2024/25";

pub const INTRO: &str = "The map below displays open source cancer data from Public Health Scotland (PHS) for each of the Scottish Health Board Regions. Click on or hover over your Health Board for an insight into the factors affecting cancer detection and treatment in your area:";

pub const MAP_CAPTION: &str =
    "Figure 1: Map of the latest cancer open data for the Scottish Health Board Regions";

pub const RELATIONSHIPS_HEADING: &str = "Potential Data Relationships";

pub const RELATIONSHIPS: &[&str] = &[
    "Prevalence is how common a disease is in a population. If in a GP practice with 10,000 patients 1,000 meet the conditions for the cancer indicator, then this practice has a cancer prevalence of 10 per 100. In other words, prevalence rates represent how many people out of every 100 are recorded as having a particular disease.",
    "SIMD quintiles divide Scotland's data zones into five equal groups, with Quintile 1 representing the 20% most deprived areas and Quintile 5 representing the 20% least deprived areas. This allows for the identification and targeting of resources to the areas of greatest need based on overall deprivation or specific factors like income, education, or health",
    "Breast screening in Scotland uses mammograms (low dose X-rays) to detect breast cancer early in women aged 50-70, with appointments offered every three years and can be booked by women over 70 by contacting their local unit. Early detection significantly improves survival rates",
    "The Scottish Bowel Screening Programme offers everyone aged 50 to 74 a free, at-home test kit every two years to check for signs of bowel cancer, specifically hidden blood in their poo. The faecal immunochemical test (FIT) can detect bowel cancer early, even before symptoms appear, when treatment is more effective and successful",
    "In Scotland, cervical screening is a routine HPV (Human Papillomavirus) test for women and people with a cervix aged 25 to 64, offered every 5 years, that checks for virus and cell changes to prevent cancer. The quick, 5-minute test involves taking a sample of cells from the cervix and is the best way to detect and treat potential cervical cancer before symptoms appear",
    "The Scottish 31-day standard for cancer care requires that 95% of eligible patients start their first cancer treatment within 31 days of the decision to treat, regardless of how they were referred. This standard applies to all cancer types and ensures that diagnosis to treatment timelines are equitable for everyone",
    "In Scotland, Systemic Anti-Cancer Therapy (SACT) refers to drug-based treatments that travel throughout the body to fight cancer cells, unlike localized treatments like surgery or radiotherapy. SACT includes various drug types, such as chemotherapy, immunotherapy, targeted therapy, and hormone therapy",
    "Deprivation is linked to worse cancer outcomes, with people in the most deprived areas facing higher cancer incidence, mortality, and more advanced diagnoses, partly due to higher rates of preventable risk factors like smoking and lower participation in cancer screening programs",
    "Scotland's population is ageing. With cancer risk increasing as we age, a larger older population naturally means more cancer cases overall",
];

pub const TABLE_CAPTION: &str = "Table 1: Latest open cancer data for the Scottish Health Board Regions with the highest 50% of column values highlighted in dark orange";

pub const REFERENCES_HEADING: &str = "Open Data References";

/// Citations grouped by publisher.
pub const REFERENCES: &[(&str, &[&str])] = &[
    (
        "Public Health Scotland",
        &[
            "https://publichealthscotland.scot/publications/general-practice-disease-prevalence-data-visualisation/general-practice-disease-prevalence-visualisation-8-july-2025/",
            "https://publichealthscotland.scot/media/34174/diseaseprevalence_methodology_and_metadata_2025-for-publication.pdf",
            "https://publichealthscotland.scot/publications/systemic-anti-cancer-therapy-sact-activity/systemic-anti-cancer-therapy-activity-11-september-2025/dashboard/",
            "https://publichealthscotland.scot/media/34170/kpi_1_coverage_uptake_2324.xlsx",
            "https://publichealthscotland.scot/media/32270/2025_04_01_breast_cancer_qpi_summary_table.xlsx",
            "https://publichealthscotland.scot/media/31821/2025-03-04-bowel-screening-kpi-report.xlsx",
            "https://www.opendata.nhs.scot/dataset/11c61a02-205b-43f6-9297-243679103617/resource/58527343-a930-4058-bf9e-3c6e5cb04010/download/cwt_31_day_standard.csv",
        ],
    ),
    (
        "National Records of Scotland",
        &["https://www.nrscotland.gov.uk/media/c0qjtpgc/age-standard-death-rates-2023-tables.xlsx"],
    ),
    (
        "Scotland's Census 2022 - National Records of Scotland",
        &["https://www.scotlandscensus.gov.uk/webapi/jsf/tableView/tableView.xhtml"],
    ),
    (
        "Scottish Surveys Core Questions 2023 - Scottish Government",
        &["https://www.gov.scot/publications/scottish-surveys-core-questions-2023/documents/"],
    ),
];

pub const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
