//! Client-side behavior embedded in every report
//!
//! The script is static text; only the theme toggle block and the initial
//! theme are parameterized. It is copied through minification untouched,
//! but sticks to block comments so it also survives naive minifiers.

use crate::config::ThemePreset;

/// `localStorage` key holding the viewer's chosen theme
pub const THEME_STORAGE_KEY: &str = "verdict-report-theme";

const CORE: &str = r##"
(function() {
  var currentFilter = 'all';
  var currentSearch = '';
  var SKIPPED = ['pending', 'skipped', 'todo', 'disabled'];

  function updateVisibility() {
    document.querySelectorAll('.test-item').forEach(function(item) {
      var status = item.dataset.status;
      var isFlaky = item.dataset.flaky === 'true';
      var text = item.textContent.toLowerCase();

      var matchesFilter;
      if (currentFilter === 'all') {
        matchesFilter = true;
      } else if (currentFilter === 'flaky') {
        matchesFilter = isFlaky;
      } else if (currentFilter === 'pending') {
        matchesFilter = SKIPPED.indexOf(status) !== -1;
      } else {
        matchesFilter = status === currentFilter;
      }
      var matchesSearch = !currentSearch || text.indexOf(currentSearch) !== -1;
      item.style.display = (matchesFilter && matchesSearch) ? 'flex' : 'none';
    });

    /* Innermost groups first so parents see their children's final state */
    Array.from(document.querySelectorAll('.describe-group')).reverse().forEach(function(group) {
      var body = ':scope > .describe-body > ';
      var hasVisible = Array.from(group.querySelectorAll(body + '.test-item')).some(function(t) { return t.style.display !== 'none'; });
      var hasVisibleNested = Array.from(group.querySelectorAll(body + '.describe-group')).some(function(g) { return g.style.display !== 'none'; });
      var isVisible = hasVisible || hasVisibleNested;
      group.style.display = isVisible ? 'block' : 'none';
      if (isVisible && currentSearch) {
        group.classList.remove('collapsed');
      }
    });

    document.querySelectorAll('.suite').forEach(function(suite) {
      var hasVisible = Array.from(suite.querySelectorAll('.test-item')).some(function(t) { return t.style.display !== 'none'; });
      suite.style.display = hasVisible ? 'block' : 'none';
      if (hasVisible && currentSearch) {
        suite.classList.remove('collapsed');
      }
    });
  }

  document.querySelectorAll('.suite-header').forEach(function(header) {
    header.addEventListener('click', function() {
      header.closest('.suite').classList.toggle('collapsed');
    });
  });

  document.querySelectorAll('.describe-header').forEach(function(header) {
    header.addEventListener('click', function(e) {
      e.stopPropagation();
      header.closest('.describe-group').classList.toggle('collapsed');
    });
  });

  document.querySelectorAll('.env-header.clickable').forEach(function(header) {
    header.addEventListener('click', function() {
      header.parentElement.classList.toggle('collapsed');
    });
  });

  document.querySelectorAll('.subnav-item').forEach(function(navItem) {
    navItem.addEventListener('click', function(e) {
      e.preventDefault();
      currentFilter = navItem.dataset.filter;
      document.querySelectorAll('.subnav-item').forEach(function(c) { c.classList.remove('active'); });
      navItem.classList.add('active');
      updateVisibility();
    });
  });

  var searchInput = document.getElementById('search-input');
  if (searchInput) {
    searchInput.addEventListener('input', function(e) {
      currentSearch = e.target.value.toLowerCase();
      updateVisibility();
    });
  }

  document.querySelectorAll('.copy-error-btn').forEach(function(btn) {
    btn.addEventListener('click', function(e) {
      e.stopPropagation();
      if (!navigator.clipboard) {
        return;
      }
      navigator.clipboard.writeText(btn.dataset.error).then(function() {
        var icon = btn.querySelector('i');
        var text = btn.querySelector('span');
        var originalIcon = icon.className;
        var originalText = text.textContent;
        icon.className = 'bi bi-check';
        text.textContent = 'Copied!';
        setTimeout(function() {
          icon.className = originalIcon;
          text.textContent = originalText;
        }, 2000);
      }).catch(function(err) {
        console.error('Failed to copy:', err);
      });
    });
  });

  document.querySelectorAll('.error-stack-toggle').forEach(function(btn) {
    btn.addEventListener('click', function(e) {
      e.stopPropagation();
      var hidden = document.getElementById(btn.dataset.target);
      var icon = btn.querySelector('i');
      var text = btn.querySelector('span');
      if (hidden.style.display === 'none') {
        hidden.style.display = 'block';
        icon.className = 'bi bi-chevron-up';
        text.textContent = 'Show less';
        btn.classList.add('expanded');
      } else {
        hidden.style.display = 'none';
        icon.className = 'bi bi-chevron-down';
        var count = hidden.querySelectorAll('.error-stack-frame').length;
        text.textContent = 'Show ' + count + ' more frame' + (count === 1 ? '' : 's');
        btn.classList.remove('expanded');
      }
    });
  });

  var jumpToTop = document.getElementById('jump-to-top');
  if (jumpToTop) {
    var toggleJumpToTop = function() {
      jumpToTop.classList.toggle('visible', window.scrollY > 300);
    };
    jumpToTop.addEventListener('click', function() {
      window.scrollTo({ top: 0, behavior: 'smooth' });
      jumpToTop.blur();
    });
    var scheduled = false;
    window.addEventListener('scroll', function() {
      if (!scheduled) {
        scheduled = true;
        window.requestAnimationFrame(function() {
          toggleJumpToTop();
          scheduled = false;
        });
      }
    });
    toggleJumpToTop();
  }
__THEME_TOGGLE__
})();
"##;

const THEME_TOGGLE: &str = r##"
  var themeToggle = document.getElementById('theme-toggle');
  var themeMenu = document.getElementById('theme-menu');
  if (themeToggle && themeMenu) {
    var applyTheme = function(theme) {
      document.documentElement.className = 'theme-' + theme;
      document.querySelectorAll('.theme-option').forEach(function(o) {
        o.classList.toggle('active', o.dataset.theme === theme);
      });
    };

    themeToggle.addEventListener('click', function(e) {
      e.stopPropagation();
      themeMenu.classList.toggle('visible');
    });

    document.querySelectorAll('.theme-option').forEach(function(option) {
      option.addEventListener('click', function() {
        applyTheme(option.dataset.theme);
        try {
          localStorage.setItem('__STORAGE_KEY__', option.dataset.theme);
        } catch (e) {}
        themeMenu.classList.remove('visible');
      });
    });

    document.addEventListener('click', function() {
      themeMenu.classList.remove('visible');
    });

    var savedTheme = null;
    try {
      savedTheme = localStorage.getItem('__STORAGE_KEY__');
    } catch (e) {}
    applyTheme(savedTheme || '__CURRENT_THEME__');
  }
"##;

/// The report's inline script
pub fn client_script(enable_theme_toggle: bool, current_theme: ThemePreset) -> String {
    let toggle = if enable_theme_toggle {
        THEME_TOGGLE
            .replace("__STORAGE_KEY__", THEME_STORAGE_KEY)
            .replace("__CURRENT_THEME__", current_theme.id())
    } else {
        String::new()
    };
    CORE.replace("__THEME_TOGGLE__", &toggle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_block_only_when_enabled() {
        let without = client_script(false, ThemePreset::Dark);
        assert!(!without.contains("theme-toggle"));
        assert!(!without.contains(THEME_STORAGE_KEY));
        assert!(!without.contains("__THEME_TOGGLE__"));

        let with = client_script(true, ThemePreset::Dracula);
        assert!(with.contains("localStorage.setItem('verdict-report-theme'"));
        assert!(with.contains("applyTheme(savedTheme || 'dracula')"));
        assert!(!with.contains("__"));
    }

    #[test]
    fn test_filters_cover_skipped_statuses() {
        let script = client_script(false, ThemePreset::Dark);
        assert!(script.contains("['pending', 'skipped', 'todo', 'disabled']"));
        assert!(script.contains("window.scrollY > 300"));
        assert!(script.contains("'Show ' + count + ' more frame'"));
    }

    #[test]
    fn test_no_line_comments() {
        let script = client_script(true, ThemePreset::Light);
        for line in script.lines() {
            assert!(!line.trim_start().starts_with("//"), "line comment: {}", line);
        }
    }
}
