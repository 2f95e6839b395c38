//! Per-configuration dependency list.
//!
//! The merged tool version catalog of a pack lists every tool any project built from
//! it might use. [`dependencies`] filters it down to what one configuration actually
//! pulls in, for display (`qagen deps`) and metadata only; rendering always sees the
//! full catalog.
//!
//! Names are compared case-insensitively with hyphens ignored, so a catalog key
//! `TestNG` or `test-ng` matches the configured runner `testng`.
//!
//! Selection is additive:
//! - always: the configured language, framework, test runner and build tool
//! - logging libraries of the language family
//! - the configured reporting tool and its adapter for the configured runner or
//!   framework (`allure` -> `allure-testng`)
//! - BDD libraries of the language family when the testing pattern is `bdd`
//! - mobile client bindings of the language family for `mobile` testing
//! - HTTP client and assertion libraries of the language family for `api` testing

use std::collections::BTreeMap;

use crate::catalog::ToolVersions;
use crate::project::ProjectConfig;

/// Language families that share library ecosystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageFamily {
    Jvm,
    JavaScript,
    Python,
    DotNet,
    Other,
}

impl LanguageFamily {
    fn of(language: &str) -> Self {
        match normalize(language).as_str() {
            "java" | "kotlin" | "groovy" => Self::Jvm,
            "javascript" | "typescript" | "js" | "ts" => Self::JavaScript,
            "python" => Self::Python,
            "csharp" | "c#" | "dotnet" | ".net" => Self::DotNet,
            _ => Self::Other,
        }
    }
}

/// Library names one concern contributes, per language family.
struct LibraryTable {
    jvm: &'static [&'static str],
    javascript: &'static [&'static str],
    python: &'static [&'static str],
    dotnet: &'static [&'static str],
}

impl LibraryTable {
    const fn for_family(&self, family: LanguageFamily) -> &'static [&'static str] {
        match family {
            LanguageFamily::Jvm => self.jvm,
            LanguageFamily::JavaScript => self.javascript,
            LanguageFamily::Python => self.python,
            LanguageFamily::DotNet => self.dotnet,
            LanguageFamily::Other => &[],
        }
    }
}

const LOGGING: LibraryTable = LibraryTable {
    jvm: &["log4j-core", "log4j-api", "slf4j-api", "logback-classic"],
    javascript: &["winston", "pino"],
    python: &["loguru"],
    dotnet: &["serilog", "serilog-sinks-console", "nlog"],
};

const BDD: LibraryTable = LibraryTable {
    jvm: &[
        "cucumber-java",
        "cucumber-testng",
        "cucumber-junit",
        "cucumber-junit-platform-engine",
        "cucumber-picocontainer",
    ],
    javascript: &["@cucumber/cucumber"],
    python: &["behave", "pytest-bdd"],
    dotnet: &["reqnroll", "specflow", "specflow-nunit"],
};

const MOBILE: LibraryTable = LibraryTable {
    jvm: &["java-client"],
    javascript: &["webdriverio", "@wdio/cli", "@wdio/appium-service"],
    python: &["appium-python-client"],
    dotnet: &["appium-webdriver"],
};

const API: LibraryTable = LibraryTable {
    jvm: &["rest-assured", "jackson-databind", "hamcrest", "json-schema-validator"],
    javascript: &["axios", "supertest", "chai", "ajv"],
    python: &["requests", "jsonschema"],
    dotnet: &["restsharp", "fluentassertions", "newtonsoft-json"],
};

/// Lowercase with hyphens removed.
fn normalize(name: &str) -> String {
    name.to_lowercase().replace('-', "")
}

/// Filter the merged catalog to the entries a configuration uses.
///
/// Pure; every returned key is a key of `catalog`.
#[must_use]
pub fn dependencies(config: &ProjectConfig, catalog: &ToolVersions) -> BTreeMap<String, String> {
    let family = LanguageFamily::of(&config.language);

    let mut wanted: Vec<String> = [
        config.language.as_str(),
        config.framework.as_str(),
        config.test_runner.as_str(),
        config.build_tool.as_str(),
    ]
    .iter()
    .map(|name| normalize(name))
    .collect();

    wanted.extend(LOGGING.for_family(family).iter().map(|name| normalize(name)));

    if config.is_bdd() {
        wanted.extend(BDD.for_family(family).iter().map(|name| normalize(name)));
    }

    let testing_type = normalize(&config.testing_type);
    if testing_type == "mobile" {
        wanted.extend(MOBILE.for_family(family).iter().map(|name| normalize(name)));
    }
    if testing_type == "api" {
        wanted.extend(API.for_family(family).iter().map(|name| normalize(name)));
    }

    // A reporting tool contributes its own entry and its adapter for the configured
    // runner or framework (`allure` -> `allure`, `allure-testng`).
    let reporting = config.reporting_tool.as_deref().map(normalize).filter(|r| !r.is_empty());
    if let Some(reporting) = reporting {
        let adapters: Vec<String> = [config.test_runner.as_str(), config.framework.as_str()]
            .iter()
            .map(|target| format!("{reporting}{}", normalize(target)))
            .collect();
        wanted.push(reporting);
        wanted.extend(adapters);
    }

    catalog
        .iter()
        .filter(|(name, _)| wanted.contains(&normalize(name)))
        .map(|(name, version)| (name.clone(), version.clone()))
        .collect()
}
