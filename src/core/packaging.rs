//! Makefile generation for the multi-runtime libsodium package.
//!
//! A [`PackagePlan`] is built from a [`PackagingConfig`] and a
//! [`ReleaseVersion`]. Rendering it produces a Makefile that downloads the
//! release archives, collects one native binary per runtime identifier, and
//! runs `dotnet pack` over the result. Paths in the Makefile always use `/`.

use crate::config::packaging::PackagingConfig;
use crate::utils::error::{ProbeError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const VERSION_PATTERN: &str = r"^((\d+\.\d+\.\d+)(\.\d+)?)(?:-(\w+(?:[_.-]\w+)*))?$";

/// A package release such as `1.0.14` or `1.0.14.1-preview-01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    /// The upstream libsodium release, always three components.
    pub libsodium_version: String,
    /// The full package version, including any fourth component and suffix.
    pub package_version: String,
}

impl ReleaseVersion {
    pub fn parse(value: &str) -> Result<Self> {
        let re = compile(VERSION_PATTERN)?;
        let caps = re.captures(value).ok_or_else(|| ProbeError::InvalidVersion {
            value: value.to_string(),
        })?;

        Ok(Self {
            libsodium_version: caps[2].to_string(),
            package_version: caps[0].to_string(),
        })
    }
}

/// Paths that depend only on the version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub build_dir: String,
    pub temp_dir: String,
    pub proj_file: String,
    pub props_file: String,
    pub pkg_file: String,
}

impl PackageLayout {
    pub fn new(config: &PackagingConfig, version: &ReleaseVersion) -> Self {
        let build_dir = join(&[config.build_dir.as_str(), version.libsodium_version.as_str()]);
        let temp_dir = join(&[config.temp_dir.as_str(), version.libsodium_version.as_str()]);
        let proj_name = format!("{}.{}.pkgproj", config.package, version.package_version);
        let proj_file = join(&[build_dir.as_str(), proj_name.as_str()]);
        let props_name = format!("{}.props", config.package);
        let props_file = join(&[build_dir.as_str(), props_name.as_str()]);
        let pkg_name = format!("{}.{}.nupkg", config.package, version.package_version);
        let pkg_file = join(&[config.output_dir.as_str(), pkg_name.as_str()]);

        Self {
            build_dir,
            temp_dir,
            proj_file,
            props_file,
            pkg_file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Unzip,
    Tar,
}

impl Extractor {
    fn command(self) -> &'static str {
        match self {
            Extractor::Unzip => "unzip -q -DD -o",
            Extractor::Tar => "tar xzmf",
        }
    }
}

/// Where a packed file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    /// A member of the downloaded release archive.
    Archive {
        extractor: Extractor,
        item_file: String,
        temp_dir: String,
        temp_file: String,
    },
    /// A binary already built by a CI stage.
    Prebuilt { input_file: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    pub url: String,
    pub cache_file: String,
    pub pack_file: String,
    pub source: ItemSource,
}

impl PackageItem {
    fn windows(
        config: &PackagingConfig,
        version: &ReleaseVersion,
        layout: &PackageLayout,
        rid: &str,
        platform: &str,
    ) -> Result<Self> {
        let url = format!(
            "{}/{}-{}-msvc.zip",
            base_url(config),
            config.library,
            version.libsodium_version
        );
        let item_file = format!(
            "{}/Release/{}/dynamic/{}.dll",
            platform, config.msvc_toolset, config.library
        );
        let temp_dir = join(&[layout.temp_dir.as_str(), rid]);
        let temp_file = join(&[temp_dir.as_str(), normalize(&item_file).as_str()]);

        Ok(Self {
            cache_file: cache_file(config, &url)?,
            pack_file: native_file(config, layout, rid, "dll"),
            url,
            source: ItemSource::Archive {
                extractor: Extractor::Unzip,
                item_file,
                temp_dir,
                temp_file,
            },
        })
    }

    fn prebuilt(
        config: &PackagingConfig,
        version: &ReleaseVersion,
        layout: &PackageLayout,
        rid: &str,
        stage: &str,
        extension: &str,
    ) -> Result<Self> {
        let url = tarball_url(config, version);
        let binary = format!("{}.{}", config.library, extension);
        let input_file = join(&["~", "workspace", stage, binary.as_str()]);

        Ok(Self {
            cache_file: cache_file(config, &url)?,
            pack_file: native_file(config, layout, rid, extension),
            url,
            source: ItemSource::Prebuilt { input_file },
        })
    }

    fn extra(
        config: &PackagingConfig,
        version: &ReleaseVersion,
        layout: &PackageLayout,
        filename: &str,
    ) -> Result<Self> {
        let url = tarball_url(config, version);
        let item_file = format!(
            "{}-{}/{}",
            config.library, version.libsodium_version, filename
        );
        let temp_dir = join(&[layout.temp_dir.as_str(), "extras"]);
        let temp_file = join(&[temp_dir.as_str(), normalize(&item_file).as_str()]);

        Ok(Self {
            cache_file: cache_file(config, &url)?,
            pack_file: join(&[layout.build_dir.as_str(), filename]),
            url,
            source: ItemSource::Archive {
                extractor: Extractor::Tar,
                item_file,
                temp_dir,
                temp_file,
            },
        })
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        match &self.source {
            ItemSource::Archive {
                extractor,
                item_file,
                temp_dir,
                temp_file,
            } => {
                copy_rule(out, &self.pack_file, temp_file)?;
                write!(out, "\n{}: {}\n", temp_file, self.cache_file)?;
                write!(out, "\t@mkdir -p $(dir $@)\n")?;
                write!(
                    out,
                    "\tcd {} && {} {} '{}'\n",
                    temp_dir,
                    extractor.command(),
                    relative_path(&self.cache_file, temp_dir)?,
                    item_file
                )?;
            }
            ItemSource::Prebuilt { input_file } => {
                copy_rule(out, &self.pack_file, input_file)?;
            }
        }
        Ok(())
    }
}

/// Everything needed to write the Makefile for one release.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    pub version: ReleaseVersion,
    pub layout: PackageLayout,
    pub items: Vec<PackageItem>,
    props_source: String,
    output_dir: String,
}

impl PackagePlan {
    pub fn new(config: &PackagingConfig, version: ReleaseVersion) -> Result<Self> {
        let layout = PackageLayout::new(config, &version);
        let mut items = Vec::new();

        for w in &config.windows {
            items.push(PackageItem::windows(config, &version, &layout, &w.rid, &w.platform)?);
        }
        for m in &config.macos {
            items.push(PackageItem::prebuilt(config, &version, &layout, &m.rid, &m.stage, "dylib")?);
        }
        for l in &config.linux {
            items.push(PackageItem::prebuilt(config, &version, &layout, &l.rid, &l.stage, "so")?);
        }
        for extra in &config.extras {
            items.push(PackageItem::extra(config, &version, &layout, extra)?);
        }

        tracing::debug!(
            "Planned {} items for {} {}",
            items.len(),
            config.package,
            version.package_version
        );

        Ok(Self {
            version,
            layout,
            items,
            props_source: config.props_file.clone(),
            output_dir: config.output_dir.clone(),
        })
    }

    /// Distinct cache files and their URLs, sorted by cache file.
    pub fn downloads(&self) -> BTreeMap<&str, &str> {
        self.items
            .iter()
            .map(|item| (item.cache_file.as_str(), item.url.as_str()))
            .collect()
    }

    pub fn render_to<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "all: {}\n", self.layout.pkg_file)?;

        for (cache_file, url) in self.downloads() {
            write!(out, "\n{}:\n", cache_file)?;
            write!(out, "\t@mkdir -p $(dir $@)\n")?;
            write!(out, "\tcurl -fsLo $@ '{}'\n", url)?;
        }

        for item in &self.items {
            item.render(out)?;
        }

        copy_rule(out, &self.layout.props_file, &self.props_source)?;

        let proj_dir = parent(&self.layout.proj_file);
        write!(out, "\n{}: {}\n", self.layout.proj_file, self.layout.props_file)?;
        write!(out, "\t@mkdir -p $(dir $@)\n")?;
        write!(
            out,
            "\techo '<Project Sdk=\"Microsoft.NET.Sdk\"><Import Project=\"{}\" /><PropertyGroup><Version>{}</Version></PropertyGroup></Project>' > $@\n",
            relative_path(&self.layout.props_file, proj_dir)?,
            self.version.package_version
        )?;

        write!(out, "\n{}:", self.layout.pkg_file)?;
        write!(out, " \\\n\t\t{}", self.layout.proj_file)?;
        write!(out, " \\\n\t\t{}", self.layout.props_file)?;
        for item in &self.items {
            write!(out, " \\\n\t\t{}", item.pack_file)?;
        }
        write!(out, "\n")?;
        write!(out, "\t@mkdir -p $(dir $@)\n")?;
        write!(
            out,
            "\tdotnet pack -o {} {}\n",
            relative_path(&self.output_dir, &self.layout.build_dir)?,
            self.layout.proj_file
        )?;

        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.render_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn write_makefile<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.render_to(&mut file)?;
        file.flush()?;

        tracing::info!("📝 Wrote {}", path.display());
        Ok(())
    }
}

fn copy_rule<W: Write>(out: &mut W, target: &str, source: &str) -> Result<()> {
    write!(out, "\n{}: {}\n", target, source)?;
    write!(out, "\t@mkdir -p $(dir $@)\n")?;
    write!(out, "\tcp -f $< $@\n")?;
    Ok(())
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ProbeError::ConfigValidationError {
        field: "pattern".to_string(),
        message: e.to_string(),
    })
}

fn base_url(config: &PackagingConfig) -> &str {
    config.release_base_url.trim_end_matches('/')
}

fn tarball_url(config: &PackagingConfig, version: &ReleaseVersion) -> String {
    format!(
        "{}/{}-{}.tar.gz",
        base_url(config),
        config.library,
        version.libsodium_version
    )
}

/// The URL flattened into a single file name under the cache directory.
fn cache_file(config: &PackagingConfig, url: &str) -> Result<String> {
    let re = compile(r"[^A-Za-z0-9.]")?;
    let flattened = re.replace_all(url, "-");
    Ok(join(&[config.cache_dir.as_str(), flattened.as_ref()]))
}

fn native_file(config: &PackagingConfig, layout: &PackageLayout, rid: &str, extension: &str) -> String {
    let binary = format!("{}.{}", config.library, extension);
    join(&[layout.build_dir.as_str(), "runtimes", rid, "native", binary.as_str()])
}

pub(crate) fn join(parts: &[&str]) -> String {
    let mut joined = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(part);
    }
    joined
}

/// Collapses `.`, `..` and repeated separators. A leading `/` is kept, and
/// `..` at the root stays at the root.
pub(crate) fn normalize(path: &str) -> String {
    let absolute = is_absolute(path);
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    match (rooted, parts.is_empty()) {
        (true, _) => format!("/{}", parts.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => parts.join("/"),
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || Path::new(path).is_absolute()
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn current_dir() -> Result<String> {
    let cwd = std::env::current_dir()?;
    Ok(cwd.to_string_lossy().replace('\\', "/"))
}

/// How to reach `target` from inside the directory `base`, where relative
/// paths on both sides start at the working directory.
///
/// An absolute target is returned unchanged. When `base` is absolute or
/// climbs above the working directory, a relative target is anchored at the
/// working directory and returned absolute.
pub(crate) fn relative_path(target: &str, base: &str) -> Result<String> {
    let target = normalize(target);
    let base = normalize(base);

    if is_absolute(&target) {
        return Ok(target);
    }
    if is_absolute(&base) || base == ".." || base.starts_with("../") {
        return Ok(normalize(&format!("{}/{}", current_dir()?, target)));
    }

    let target_parts: Vec<&str> = target.split('/').filter(|p| *p != ".").collect();
    let base_parts: Vec<&str> = base.split('/').filter(|p| *p != ".").collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; base_parts.len() - common];
    parts.extend_from_slice(&target_parts[common..]);

    if parts.is_empty() {
        Ok(".".to_string())
    } else {
        Ok(parts.join("/"))
    }
}
