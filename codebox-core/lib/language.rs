//! Supported languages and the registry of their build and run commands.
//!
//! Every language is described by a [`LanguageProfile`]: the file name the source is written to,
//! an optional build command and a run command. Commands are argv templates in which
//! `{workdir}` is replaced by the workspace path. The built-in table covers JavaScript,
//! TypeScript, Python, C++ and Java; adding a language means adding a [`Language`] variant and
//! one table entry.

use std::{
    fmt,
    path::Path,
    str::FromStr,
    sync::{Arc, LazyLock},
};

use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::{CodeboxError, CodeboxResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Placeholder replaced by the workspace directory when a command template is rendered.
pub const WORKDIR_PLACEHOLDER: &str = "{workdir}";

static BUILTIN_REGISTRY: LazyLock<Arc<Registry>> = LazyLock::new(|| {
    Arc::new(Registry {
        profiles: vec![
            LanguageProfile::new(
                Language::JavaScript,
                "main.cjs",
                None,
                CommandTemplate::new(["node", "{workdir}/main.cjs"]),
            ),
            // ts-node transpiles as part of running, so there is no separate build step.
            LanguageProfile::new(
                Language::TypeScript,
                "main.ts",
                None,
                CommandTemplate::new(["npx", "ts-node", "{workdir}/main.ts"]),
            ),
            LanguageProfile::new(
                Language::Python,
                "main.py",
                None,
                CommandTemplate::new(["python3", "{workdir}/main.py"]),
            ),
            LanguageProfile::new(
                Language::Cpp,
                "main.cpp",
                Some(CommandTemplate::new([
                    "g++",
                    "-O2",
                    "{workdir}/main.cpp",
                    "-o",
                    "{workdir}/main",
                ])),
                CommandTemplate::new(["{workdir}/main"]),
            ),
            // The entry class is always `Main`, so the file name must match it.
            LanguageProfile::new(
                Language::Java,
                "Main.java",
                Some(CommandTemplate::new(["javac", "{workdir}/Main.java"])),
                CommandTemplate::new(["java", "-cp", "{workdir}", "Main"]),
            ),
        ],
    })
});

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A language codebox knows how to build and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// JavaScript, run with Node.js
    JavaScript,

    /// TypeScript, transpiled and run with ts-node
    TypeScript,

    /// Python 3
    Python,

    /// C++, compiled with g++
    Cpp,

    /// Java, compiled with javac
    Java,
}

/// An argv list whose arguments may contain [`WORKDIR_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(Vec<String>);

/// The fixed build and run recipe for one language.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct LanguageProfile {
    /// The language this profile describes
    language: Language,

    /// The file name the source is written to inside the workspace
    source_file: String,

    /// The compile command, if the language has a build step
    build: Option<CommandTemplate>,

    /// The command that runs the program
    run: CommandTemplate,
}

/// Lookup table from language to profile.
///
/// The registry's keys are the single source of truth for which languages are supported.
#[derive(Debug, Clone)]
pub struct Registry {
    profiles: Vec<LanguageProfile>,
}

/// Whether the toolchain behind a profile is installed on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageAvailability {
    /// The language checked
    pub language: Language,

    /// Whether every program the profile invokes was found on `PATH`
    pub available: bool,

    /// Programs that could not be found
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Language {
    /// Every language with a built-in profile.
    pub const ALL: [Language; 5] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Python,
        Language::Cpp,
        Language::Java,
    ];

    /// The identifier used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
        }
    }
}

impl CommandTemplate {
    /// Creates a template from argv parts.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Substitutes the workspace directory into every argument.
    pub fn render(&self, workdir: &Path) -> Vec<String> {
        let workdir = workdir.to_string_lossy();
        self.0
            .iter()
            .map(|part| part.replace(WORKDIR_PLACEHOLDER, &workdir))
            .collect()
    }

    /// The program the template invokes, before substitution.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Whether the template has no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl LanguageProfile {
    /// Creates a profile. An empty build template means the language has no build step.
    pub fn new(
        language: Language,
        source_file: impl Into<String>,
        build: Option<CommandTemplate>,
        run: CommandTemplate,
    ) -> Self {
        Self {
            language,
            source_file: source_file.into(),
            build: build.filter(|template| !template.is_empty()),
            run,
        }
    }

    /// Whether the profile compiles before running.
    pub fn has_build_step(&self) -> bool {
        self.build.is_some()
    }

    /// Programs this profile needs from the host, skipping ones produced inside the workspace.
    fn host_programs(&self) -> impl Iterator<Item = &str> {
        self.build
            .iter()
            .chain(std::iter::once(&self.run))
            .filter_map(CommandTemplate::program)
            .filter(|program| !program.contains(WORKDIR_PLACEHOLDER))
    }
}

impl Registry {
    /// The built-in registry, created on first use and shared afterward.
    pub fn builtin() -> Arc<Registry> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    /// Creates a registry from custom profiles.
    ///
    /// A later profile for the same language replaces an earlier one.
    pub fn new(profiles: impl IntoIterator<Item = LanguageProfile>) -> CodeboxResult<Self> {
        let mut registry = Self {
            profiles: Vec::new(),
        };

        for profile in profiles {
            if profile.run.is_empty() {
                return Err(CodeboxError::Config(format!(
                    "profile for {} has an empty run command",
                    profile.language
                )));
            }

            let name = Path::new(&profile.source_file);
            if profile.source_file.is_empty() || name.components().count() != 1 {
                return Err(CodeboxError::Config(format!(
                    "profile for {} has an invalid source file name {:?}",
                    profile.language, profile.source_file
                )));
            }

            registry
                .profiles
                .retain(|existing| existing.language != profile.language);
            registry.profiles.push(profile);
        }

        Ok(registry)
    }

    /// Looks up the profile for a language.
    pub fn resolve(&self, language: Language) -> CodeboxResult<&LanguageProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.language == language)
            .ok_or_else(|| CodeboxError::UnsupportedLanguage(language.to_string()))
    }

    /// Looks up the profile for a wire identifier such as `"cpp"`.
    pub fn resolve_name(&self, name: &str) -> CodeboxResult<&LanguageProfile> {
        self.profiles
            .iter()
            .find(|profile| profile.language.as_str() == name)
            .ok_or_else(|| CodeboxError::UnsupportedLanguage(name.to_string()))
    }

    /// The languages this registry supports.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.profiles.iter().map(|profile| profile.language)
    }

    /// Checks, for every profile, whether the programs it invokes are on `PATH`.
    pub fn availability(&self) -> Vec<LanguageAvailability> {
        self.profiles
            .iter()
            .map(|profile| {
                let missing: Vec<String> = profile
                    .host_programs()
                    .filter(|program| which::which(program).is_err())
                    .map(str::to_string)
                    .collect();

                LanguageAvailability {
                    language: profile.language,
                    available: missing.is_empty(),
                    missing,
                }
            })
            .collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CodeboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| CodeboxError::UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
