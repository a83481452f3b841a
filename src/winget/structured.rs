//! 通过 Microsoft.WinGet.Client PowerShell 模块获取结构化结果
//!
//! 脚本把每个包打印为一行：`#` 开头，字段之间用制表符分隔。
//! 不以 `#` 开头的行（模块版本号、警告等）全部忽略。

use super::types::{Operation, RawPackageRecord, TableShape};

const PRELUDE: &str = "Write-Output (Get-Module -Name Microsoft.WinGet.Client).Version
Import-Module Microsoft.WinGet.Client
";

/// 生成写入 PowerShell 标准输入的脚本
pub fn script(operation: &Operation) -> String {
    let body = match operation {
        Operation::Search { query } => format!(
            r##"function Print-WinGetPackage {{
    param (
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Name,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Id,
        [Parameter(ValueFromPipelineByPropertyName)] [string[]] $AvailableVersions,
        [Parameter(ValueFromPipelineByPropertyName)] [string] $Source
    )
    process {{
        Write-Output("#" + $Name + "`t" + $Id + "`t" + $AvailableVersions[0] + "`t" + $Source)
    }}
}}

Find-WinGetPackage -Query {} | Print-WinGetPackage
"##,
            quote(query)
        ),
        Operation::ListInstalled => r##"function Print-WinGetPackage {
    param (
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Name,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Id,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $InstalledVersion,
        [Parameter(ValueFromPipelineByPropertyName)] [string] $Source
    )
    process {
        Write-Output("#" + $Name + "`t" + $Id + "`t" + $InstalledVersion + "`t" + $Source)
    }
}

Get-WinGetPackage | Print-WinGetPackage
"##
        .to_string(),
        Operation::ListUpdates => r##"function Print-WinGetPackage {
    param (
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Name,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $Id,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [string] $InstalledVersion,
        [Parameter(ValueFromPipelineByPropertyName)] [string[]] $AvailableVersions,
        [Parameter(Mandatory,ValueFromPipelineByPropertyName)] [bool] $IsUpdateAvailable,
        [Parameter(ValueFromPipelineByPropertyName)] [string] $Source
    )
    process {
        if ($IsUpdateAvailable) {
            Write-Output("#" + $Name + "`t" + $Id + "`t" + $InstalledVersion + "`t" + $AvailableVersions[0] + "`t" + $Source)
        }
    }
}

Get-WinGetPackage | Print-WinGetPackage
"##
        .to_string(),
    };
    format!("{}{}\nexit\n", PRELUDE, body)
}

/// PowerShell 单引号字面量，内部的 `'` 写成 `''`
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// 解析脚本输出的一行；不是包记录时返回 None
pub fn parse_line(shape: TableShape, line: &str) -> Option<RawPackageRecord> {
    let body = line.strip_prefix('#')?;
    let fields: Vec<&str> = body.split('\t').collect();
    let source = |index: usize| {
        fields
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match shape {
        TableShape::Search | TableShape::Installed => {
            if fields.len() < 4 {
                return None;
            }
            Some(RawPackageRecord {
                name: fields[0].to_string(),
                id: fields[1].to_string(),
                installed_version: fields[2].to_string(),
                available_version: None,
                source_name: source(3),
            })
        }
        TableShape::Updates => {
            if fields.len() < 5 {
                return None;
            }
            Some(RawPackageRecord {
                name: fields[0].to_string(),
                id: fields[1].to_string(),
                installed_version: fields[2].to_string(),
                available_version: Some(fields[3].to_string()),
                source_name: source(4),
            })
        }
    }
}
