//! Common matrix variables and the values offered for them.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatrixPreset {
    /// Variable name as written under `strategy.matrix`
    pub name: &'static str,
    pub label: &'static str,
    pub values: &'static [&'static str],
}

pub const COMMON_MATRIX_VARIABLES: &[MatrixPreset] = &[
    MatrixPreset {
        name: "node",
        label: "Node.js",
        values: &["16", "18", "20", "22"],
    },
    MatrixPreset {
        name: "python",
        label: "Python",
        values: &["3.8", "3.9", "3.10", "3.11", "3.12", "3.13"],
    },
    MatrixPreset {
        name: "os",
        label: "Operating System",
        values: &[
            "ubuntu-latest",
            "ubuntu-22.04",
            "ubuntu-20.04",
            "windows-latest",
            "windows-2022",
            "windows-2019",
            "macos-latest",
            "macos-14",
            "macos-13",
            "macos-12",
        ],
    },
    MatrixPreset {
        name: "java",
        label: "Java",
        values: &["8", "11", "17", "21"],
    },
    MatrixPreset {
        name: "go",
        label: "Go",
        values: &["1.19", "1.20", "1.21", "1.22", "1.23"],
    },
    MatrixPreset {
        name: "ruby",
        label: "Ruby",
        values: &["3.0", "3.1", "3.2", "3.3"],
    },
    MatrixPreset {
        name: "php",
        label: "PHP",
        values: &["8.0", "8.1", "8.2", "8.3"],
    },
    MatrixPreset {
        name: "dotnet",
        label: ".NET",
        values: &["6.0", "7.0", "8.0"],
    },
];

pub fn matrix_preset(name: &str) -> Option<&'static MatrixPreset> {
    COMMON_MATRIX_VARIABLES.iter().find(|preset| preset.name == name)
}

/// Suggested values for a matrix variable, if it is a common one.
pub fn matrix_variable_values(name: &str) -> Option<&'static [&'static str]> {
    matrix_preset(name).map(|preset| preset.values)
}

pub fn is_common_matrix_variable(name: &str) -> bool {
    matrix_preset(name).is_some()
}
