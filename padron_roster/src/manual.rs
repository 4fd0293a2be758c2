/*!

This is the long-form manual for `padron_roster` and the `padron` command line.

## The hierarchy

The roster has three levels below the superadmin:

* coordinators, added by the superadmin,
* sub-coordinators, added by a coordinator who then owns them,
* voters, added either by a coordinator (direct voters) or by one of its
  sub-coordinators (indirect voters of the coordinator).

A person of the padron holds at most one assignment in the whole hierarchy.
People are identified by their CI, compared on digits only: `1.234.567-8`
and `12345678` are the same person.

## Input tables

Four tables are read: the padron and the three assignment tables. Each one is
described by a source with a `provider`:

* `csv` Comma Separated Values with a header row.
* `json` An array of objects, as exported by the hosted database. CI columns
  may be numbers or strings.
* `xlsx` An Excel workbook. The first row is the header. Use
  `worksheetName` to pick a sheet, the first one is used otherwise.

The column names follow the database:

| table            | columns                                                                  |
|------------------|--------------------------------------------------------------------------|
| padron           | `ci`, `nombre`, `apellido`, `telefono`, `direccion`, `seccional`, `local_votacion`, `mesa`, `orden` |
| coordinadores    | `ci`, `telefono`                                                         |
| subcoordinadores | `ci`, `coordinador_ci`, `asignado_por`, `telefono`                       |
| votantes         | `ci`, `asignado_por`, `voto_confirmado`, `telefono`                      |

Unknown columns are ignored. A table that cannot be read is treated as empty
and a warning is logged.

## Offline cache

The padron is large and rarely changes. When the cache is enabled, every
successful read of the padron is stored in the cache directory, and the cached
copy is used when the padron source cannot be read. `--clear-cache` empties it.

## Statistics

Counters depend on the role of the acting user:

* `superadmin`: `coordinadores`, `subcoordinadores`, `votantes` and
  `votantesTotales`, the number of people across the three levels.
* `coordinador`: `subcoordinadores`, `votantesDirectos`,
  `votantesIndirectos` and `total`, which also counts the sub-coordinators.
* `subcoordinador`: `votantes` and `votantesTotales`, which counts the
  sub-coordinator themselves.

## Search

The search takes a free-text query. Case and accents are ignored. Every word
of the query must appear in the CI or in the full name of the person. A person
whose CI is exactly the query is listed first, then results are sorted by given
name. Results come in pages of 20 (configurable with `search.pageSize`). A
blank query gives no results.

## Configuration

```json
{
  "outputSettings": { "campaignName": "Elecciones 2026", "outputPath": "summary.json" },
  "sources": {
    "padron": { "provider": "xlsx", "filePath": "padron.xlsx", "worksheetName": "Padron" },
    "coordinadores": { "provider": "json", "filePath": "coordinadores.json" },
    "subcoordinadores": { "provider": "json", "filePath": "subcoordinadores.json" },
    "votantes": { "provider": "csv", "filePath": "votantes.csv" }
  },
  "cache": { "directory": ".padron-cache", "enabled": true },
  "search": { "pageSize": 20 }
}
```

Paths are relative to the configuration file.

*/
